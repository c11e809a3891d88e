use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use proficiency_core::model::{Report, ScoreResult};

/// Where the report attached to an outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    /// Personalised report from the remote generator.
    Generated,
    /// Local report for a test taken from the static bank.
    Offline,
    /// Placeholder after the generator hit its usage limit.
    AiLimited,
    /// Placeholder after any other report failure.
    Unavailable,
}

/// Everything `finish_test` hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub score: ScoreResult,
    pub report: Report,
    pub status: ReportStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl TestOutcome {
    /// Whether the report is a placeholder standing in for a failed remote report.
    #[must_use]
    pub fn ai_limited(&self) -> bool {
        matches!(
            self.status,
            ReportStatus::AiLimited | ReportStatus::Unavailable
        )
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.status == ReportStatus::Offline
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(duration.num_milliseconds())
}

pub(crate) fn placeholder_report(score: &ScoreResult, status: ReportStatus) -> Report {
    let (description, recommendations, next_steps) = match status {
        ReportStatus::AiLimited => (
            "The AI usage limit for this demo has been reached, so a detailed analysis is not available right now.",
            vec![
                "Practice English regularly",
                "Wait a while for the AI limits to reset",
            ],
            vec![
                "Identify your weak areas",
                "Try again later for a detailed analysis",
            ],
        ),
        _ => (
            "A detailed analysis could not be created because of a technical problem.",
            vec!["Keep practising English"],
            vec!["Please try again later"],
        ),
    };

    let strengths = if status == ReportStatus::AiLimited && score.accuracy_percent > 70 {
        vec!["General English performance".to_string()]
    } else {
        Vec::new()
    };

    Report {
        level: Some(score.level),
        level_description: Some(description.to_string()),
        strengths,
        weak_areas: Vec::new(),
        overall_recommendations: recommendations.into_iter().map(str::to_string).collect(),
        next_steps: next_steps.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proficiency_core::scoring::calculate_results;
    use proficiency_core::StaticQuestionBank;

    fn perfect_score() -> ScoreResult {
        let bank = StaticQuestionBank::embedded().unwrap();
        let answers: Vec<_> = bank.questions().iter().map(|q| Some(q.correct())).collect();
        calculate_results(&answers, bank.questions())
    }

    #[test]
    fn quota_placeholder_keeps_level_and_strength() {
        let score = perfect_score();
        let report = placeholder_report(&score, ReportStatus::AiLimited);
        assert_eq!(report.level, Some(score.level));
        assert_eq!(report.strengths.len(), 1);
        assert!(report.weak_areas.is_empty());
        assert_eq!(report.next_steps.len(), 2);
    }

    #[test]
    fn failure_placeholder_is_minimal() {
        let report = placeholder_report(&perfect_score(), ReportStatus::Unavailable);
        assert!(report.strengths.is_empty());
        assert_eq!(report.overall_recommendations, vec!["Keep practising English"]);
    }
}
