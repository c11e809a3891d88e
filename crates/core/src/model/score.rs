use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::level::{Level, LevelInfo};

/// Correct/total counts for one slice of a test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub correct: usize,
    pub total: usize,
    pub accuracy_percent: u8,
}

impl CategoryStats {
    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        Self {
            correct,
            total,
            accuracy_percent: percent(correct, total),
        }
    }

    /// Exact fraction correct, 0.0 for an empty slice.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ratio(self.correct, self.total)
    }
}

/// Qualitative label for topic accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performance {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Performance {
    /// Label for an accuracy expressed as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.80 {
            Performance::Excellent
        } else if ratio >= 0.65 {
            Performance::Good
        } else if ratio >= 0.50 {
            Performance::Fair
        } else {
            Performance::NeedsImprovement
        }
    }

    /// Label for a topic already known to be weak: only `fair` or `needs-improvement`.
    #[must_use]
    pub fn weak_area(ratio: f64) -> Self {
        if ratio >= 0.50 {
            Performance::Fair
        } else {
            Performance::NeedsImprovement
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Performance::Excellent => "excellent",
            Performance::Good => "good",
            Performance::Fair => "fair",
            Performance::NeedsImprovement => "needs-improvement",
        }
    }
}

/// Per-topic result with its performance label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    #[serde(flatten)]
    pub stats: CategoryStats,
    pub performance: Performance,
}

impl TopicStats {
    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        let stats = CategoryStats::from_counts(correct, total);
        Self {
            stats,
            performance: Performance::from_ratio(stats.ratio()),
        }
    }
}

/// Read-only snapshot of a scored test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total_correct: usize,
    pub total_questions: usize,
    pub accuracy_percent: u8,
    pub composite_score: f64,
    pub level: Level,
    pub grammar: CategoryStats,
    pub reading: CategoryStats,
    pub per_topic: BTreeMap<String, TopicStats>,
    pub per_level: BTreeMap<Level, CategoryStats>,
}

impl ScoreResult {
    #[must_use]
    pub fn level_info(&self) -> LevelInfo {
        self.level.info()
    }

    /// Exact overall fraction correct.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.total_correct, self.total_questions)
    }

    /// Topics whose accuracy is below `threshold` (a fraction), weakest first.
    ///
    /// Ties keep alphabetical topic order.
    #[must_use]
    pub fn weak_topics(&self, threshold: f64) -> Vec<(&str, &TopicStats)> {
        let mut weak: Vec<_> = self
            .per_topic
            .iter()
            .filter(|(_, t)| t.stats.ratio() < threshold)
            .map(|(name, t)| (name.as_str(), t))
            .collect();
        weak.sort_by(|a, b| a.1.stats.ratio().total_cmp(&b.1.stats.ratio()));
        weak
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn percent(correct: usize, total: usize) -> u8 {
    (ratio(correct, total) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_percent_rounds() {
        assert_eq!(CategoryStats::from_counts(2, 3).accuracy_percent, 67);
        assert_eq!(CategoryStats::from_counts(1, 3).accuracy_percent, 33);
        assert_eq!(CategoryStats::from_counts(0, 0).accuracy_percent, 0);
    }

    #[test]
    fn performance_labels_follow_cut_points() {
        assert_eq!(Performance::from_ratio(0.8), Performance::Excellent);
        assert_eq!(Performance::from_ratio(0.7), Performance::Good);
        assert_eq!(Performance::from_ratio(0.5), Performance::Fair);
        assert_eq!(Performance::from_ratio(0.49), Performance::NeedsImprovement);
    }

    #[test]
    fn topic_stats_flatten_in_json() {
        let json = serde_json::to_value(TopicStats::from_counts(1, 2)).unwrap();
        assert_eq!(json["correct"], 1);
        assert_eq!(json["accuracyPercent"], 50);
        assert_eq!(json["performance"], "fair");
    }
}
