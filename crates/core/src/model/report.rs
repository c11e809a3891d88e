use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::model::level::Level;

/// Feedback report for a finished test.
///
/// Usually produced by a remote generator, so every field is optional on the
/// wire and defaults to empty. Treat the contents as untrusted display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_description: Option<String>,
    pub strengths: Vec<String>,
    pub weak_areas: Vec<WeakArea>,
    pub overall_recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}

/// One topic the learner should work on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeakArea {
    pub topic: String,
    pub performance: String,
    pub explanation: String,
    pub recommendations: Vec<String>,
}

impl Report {
    /// True when the report carries no feedback at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
            && self.weak_areas.is_empty()
            && self.overall_recommendations.is_empty()
            && self.next_steps.is_empty()
    }

    /// Render the feedback sections as plain text, e.g. as translation input.
    ///
    /// Empty sections are omitted.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();

        if !self.strengths.is_empty() {
            out.push_str("Strengths:\n");
            out.push_str(&self.strengths.join("\n"));
            out.push_str("\n\n");
        }

        if !self.weak_areas.is_empty() {
            out.push_str("Areas for Improvement:\n");
            for area in &self.weak_areas {
                let _ = writeln!(out, "{}: {}", area.topic, area.explanation);
                if !area.recommendations.is_empty() {
                    let _ = writeln!(out, "Recommendations: {}", area.recommendations.join(", "));
                }
                out.push('\n');
            }
        }

        if !self.overall_recommendations.is_empty() {
            out.push_str("Study Recommendations:\n");
            out.push_str(&self.overall_recommendations.join("\n"));
            out.push_str("\n\n");
        }

        if !self.next_steps.is_empty() {
            out.push_str("Next Steps:\n");
            out.push_str(&self.next_steps.join("\n"));
        }

        out.trim_end().to_string()
    }
}
