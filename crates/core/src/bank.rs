//! Embedded fallback question set and the offline report built from it.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Choice, Performance, Question, Report, ScoreResult, WeakArea};
use crate::scoring::{self, WEAK_TOPIC_THRESHOLD};

const EMBEDDED_QUESTIONS: &str = include_str!("../data/static_questions.json");

/// Errors raised while building a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank data is invalid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question bank is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct BankFile {
    version: u32,
    questions: Vec<Question>,
}

/// Fixed, ordered question set used when remote generation is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticQuestionBank {
    version: u32,
    questions: Vec<Question>,
}

/// Result of scoring a test taken from the static bank.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReport {
    pub score: ScoreResult,
    pub report: Report,
}

impl StaticQuestionBank {
    /// Load the bank bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the bundled data cannot be parsed.
    pub fn embedded() -> Result<Self, BankError> {
        Self::from_json(EMBEDDED_QUESTIONS)
    }

    /// Load a bank from a JSON document of the form `{ "version": n, "questions": [...] }`.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed data and `BankError::Empty` when
    /// the document holds no questions.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let file: BankFile = serde_json::from_str(json)?;
        if file.questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self {
            version: file.version,
            questions: file.questions,
        })
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Score a test and build a basic report without any remote call.
    ///
    /// Weak areas are topics under 70% accuracy, weakest first.
    #[must_use]
    pub fn offline_report(&self, answers: &[Option<Choice>], questions: &[Question]) -> OfflineReport {
        let score = scoring::calculate_results(answers, questions);

        let weak_areas = score
            .weak_topics(WEAK_TOPIC_THRESHOLD)
            .into_iter()
            .map(|(topic, stats)| WeakArea {
                topic: topic.to_string(),
                performance: Performance::weak_area(stats.stats.ratio())
                    .as_str()
                    .to_string(),
                explanation: format!(
                    "You got {}/{} questions correct in this area.",
                    stats.stats.correct, stats.stats.total
                ),
                recommendations: scoring::topic_recommendations(topic)
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect(),
            })
            .collect();

        let strengths = if score.accuracy() > WEAK_TOPIC_THRESHOLD {
            vec!["General English knowledge".to_string()]
        } else {
            Vec::new()
        };

        let report = Report {
            level: Some(score.level),
            level_description: Some(format!(
                "{} This offline result uses a fixed demo question set; a detailed personalised analysis needs the AI service.",
                score.level_info().description
            )),
            strengths,
            weak_areas,
            overall_recommendations: vec![
                "Practice English regularly".to_string(),
                "Focus on the topics where you scored lowest".to_string(),
                "Build a daily English reading habit".to_string(),
            ],
            next_steps: vec![
                "Use this demo test as a reference point".to_string(),
                "Identify your weak areas and study them".to_string(),
                "Retake the test once the AI service is available".to_string(),
            ],
        };

        OfflineReport { score, report }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, QuestionDraft, QuestionId, QuestionKind, QuestionSlot};

    fn bank() -> StaticQuestionBank {
        StaticQuestionBank::embedded().unwrap()
    }

    #[test]
    fn embedded_bank_has_thirty_questions() {
        let bank = bank();
        assert_eq!(bank.len(), 30);
        assert_eq!(bank.version(), 1);
        let reading = bank
            .questions()
            .iter()
            .filter(|q| q.kind() == QuestionKind::Reading)
            .count();
        assert_eq!(reading, 5);
        for level in Level::ALL {
            assert!(bank.questions().iter().any(|q| q.level() == level));
        }
    }

    #[test]
    fn reading_questions_carry_passages() {
        for q in bank().questions() {
            assert_eq!(q.kind() == QuestionKind::Reading, q.passage().is_some());
        }
    }

    #[test]
    fn embedded_bank_is_deterministic() {
        assert_eq!(bank(), bank());
    }

    #[test]
    fn empty_bank_is_rejected() {
        let err = StaticQuestionBank::from_json(r#"{"version":1,"questions":[]}"#).unwrap_err();
        assert!(matches!(err, BankError::Empty));
        let err = StaticQuestionBank::from_json("not json").unwrap_err();
        assert!(matches!(err, BankError::Parse(_)));
    }

    #[test]
    fn all_correct_is_full_marks_at_c1() {
        let bank = bank();
        let answers: Vec<_> = bank.questions().iter().map(|q| Some(q.correct())).collect();
        let offline = bank.offline_report(&answers, bank.questions());
        assert_eq!(offline.score.total_correct, 30);
        assert_eq!(offline.score.total_questions, 30);
        assert_eq!(offline.score.accuracy_percent, 100);
        assert_eq!(offline.score.level, Level::C1);
        assert!(offline.report.weak_areas.is_empty());
        assert_eq!(offline.report.strengths.len(), 1);
    }

    #[test]
    fn all_wrong_is_zero_at_a1() {
        let bank = bank();
        let answers: Vec<_> = bank
            .questions()
            .iter()
            .map(|q| Some(q.correct().next_wrapping()))
            .collect();
        let offline = bank.offline_report(&answers, bank.questions());
        assert_eq!(offline.score.total_correct, 0);
        assert_eq!(offline.score.accuracy_percent, 0);
        assert_eq!(offline.score.level, Level::A1);
        assert!(offline.report.strengths.is_empty());
        assert_eq!(offline.report.weak_areas.len(), offline.score.per_topic.len());
        assert!(
            offline
                .report
                .weak_areas
                .iter()
                .all(|w| w.performance == "needs-improvement")
        );
    }

    #[test]
    fn weak_area_labels_are_fair_or_needs_improvement() {
        let questions: Vec<Question> = (0..5)
            .map(|i| {
                QuestionDraft {
                    question: format!("Question {i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct: 1,
                    topic: Some(if i < 3 { "Articles" } else { "Plurals" }.into()),
                    explanation: None,
                }
                .validate(QuestionSlot {
                    id: QuestionId::new(format!("grammar-A1-{i}")),
                    kind: QuestionKind::Grammar,
                    level: Level::A1,
                    passage: None,
                })
                .unwrap()
            })
            .collect();
        let right = Some(Choice::new(1).unwrap());
        let wrong = Some(Choice::new(0).unwrap());
        let answers = vec![right, right, wrong, wrong, wrong];

        let offline = bank().offline_report(&answers, &questions);
        let articles = offline
            .report
            .weak_areas
            .iter()
            .find(|w| w.topic == "Articles")
            .unwrap();
        assert_eq!(articles.performance, "fair");
        assert_eq!(articles.explanation, "You got 2/3 questions correct in this area.");
        let plurals = offline
            .report
            .weak_areas
            .iter()
            .find(|w| w.topic == "Plurals")
            .unwrap();
        assert_eq!(plurals.performance, "needs-improvement");
    }
}
