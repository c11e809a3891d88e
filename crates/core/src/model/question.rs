use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::level::Level;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Topic assigned when a generated question does not name one.
pub const DEFAULT_TOPIC: &str = "General";

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("choice index out of range: {0}")]
    InvalidChoice(i64),

    #[error("expected {OPTION_COUNT} options, got {0}")]
    OptionCount(usize),

    #[error("question text is empty")]
    EmptyText,
}

//
// ─── KIND ─────────────────────────────────────────────────────────────────────
//

/// Question category. This field alone decides grammar vs. reading scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Grammar,
    Reading,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Grammar => "grammar",
            QuestionKind::Reading => "reading",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── CHOICE ───────────────────────────────────────────────────────────────────
//

/// Index of one of the four options, always in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Choice(u8);

impl Choice {
    /// Validates a raw option index.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidChoice` if the value is not in `0..=3`.
    pub fn new(value: u8) -> Result<Self, QuestionError> {
        if usize::from(value) < OPTION_COUNT {
            Ok(Self(value))
        } else {
            Err(QuestionError::InvalidChoice(i64::from(value)))
        }
    }

    /// All four choices in option order.
    #[must_use]
    pub fn all() -> [Choice; OPTION_COUNT] {
        [Choice(0), Choice(1), Choice(2), Choice(3)]
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// The choice after this one, wrapping from 3 back to 0.
    #[must_use]
    pub fn next_wrapping(self) -> Choice {
        Choice((self.0 + 1) % 4)
    }

    /// Option letter as printed to the learner (`A`..=`D`).
    #[must_use]
    pub fn letter(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl TryFrom<u8> for Choice {
    type Error = QuestionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Choice> for u8 {
    fn from(choice: Choice) -> Self {
        choice.0
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single multiple-choice item. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(rename = "type")]
    kind: QuestionKind,
    level: Level,
    topic: String,
    question: String,
    options: [String; OPTION_COUNT],
    correct: Choice,
    #[serde(default)]
    explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passage: Option<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> Choice {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn passage(&self) -> Option<&str> {
        self.passage.as_deref()
    }

    /// Whether `answer` selects the correct option. Unset answers are wrong.
    #[must_use]
    pub fn is_correct(&self, answer: Option<Choice>) -> bool {
        answer == Some(self.correct)
    }
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Loosely-typed question as returned by a remote generator.
///
/// Nothing here is trusted: `validate` enforces the option count, the choice
/// range and a non-empty text before a `Question` exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub correct: i64,
    pub topic: Option<String>,
    pub explanation: Option<String>,
}

/// Placement data the caller controls when validating a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSlot {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub level: Level,
    pub passage: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft and place it at `slot`.
    ///
    /// The slot's kind and level win over anything the draft claims.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, there are not exactly four
    /// options, or `correct` is not a valid option index.
    pub fn validate(self, slot: QuestionSlot) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let count = self.options.len();
        let options: [String; OPTION_COUNT] = self
            .options
            .try_into()
            .map_err(|_| QuestionError::OptionCount(count))?;
        let correct = u8::try_from(self.correct)
            .map_err(|_| QuestionError::InvalidChoice(self.correct))
            .and_then(Choice::new)?;
        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        Ok(Question {
            id: slot.id,
            kind: slot.kind,
            level: slot.level,
            topic,
            question: self.question,
            options,
            correct,
            explanation: self.explanation.unwrap_or_default(),
            passage: slot.passage,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            question: "She ___ to work every day.".into(),
            options: vec!["go".into(), "goes".into(), "going".into(), "gone".into()],
            correct: 1,
            topic: Some("Present Simple".into()),
            explanation: Some("Third person singular takes -s.".into()),
        }
    }

    fn slot() -> QuestionSlot {
        QuestionSlot {
            id: QuestionId::new("grammar-A1-1"),
            kind: QuestionKind::Grammar,
            level: Level::A1,
            passage: None,
        }
    }

    #[test]
    fn choice_rejects_out_of_range() {
        assert!(Choice::new(3).is_ok());
        assert_eq!(Choice::new(4), Err(QuestionError::InvalidChoice(4)));
    }

    #[test]
    fn choice_wraps_and_letters() {
        let last = Choice::new(3).unwrap();
        assert_eq!(last.next_wrapping().value(), 0);
        assert_eq!(last.letter(), 'D');
    }

    #[test]
    fn draft_validates_into_question() {
        let q = draft().validate(slot()).unwrap();
        assert_eq!(q.kind(), QuestionKind::Grammar);
        assert_eq!(q.level(), Level::A1);
        assert_eq!(q.correct().value(), 1);
        assert_eq!(q.topic(), "Present Simple");
        assert!(q.is_correct(Some(Choice::new(1).unwrap())));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn draft_with_three_options_fails() {
        let mut d = draft();
        d.options.pop();
        assert_eq!(d.validate(slot()).unwrap_err(), QuestionError::OptionCount(3));
    }

    #[test]
    fn draft_with_negative_correct_fails() {
        let mut d = draft();
        d.correct = -1;
        assert_eq!(d.validate(slot()).unwrap_err(), QuestionError::InvalidChoice(-1));
    }

    #[test]
    fn draft_without_topic_gets_default() {
        let mut d = draft();
        d.topic = Some("  ".into());
        let q = d.validate(slot()).unwrap();
        assert_eq!(q.topic(), DEFAULT_TOPIC);
    }

    #[test]
    fn question_json_uses_type_field() {
        let q = draft().validate(slot()).unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "grammar");
        assert_eq!(json["correct"], 1);
        assert!(json.get("passage").is_none());
    }

    #[test]
    fn question_json_rejects_bad_choice() {
        let json = r#"{"id":"x","type":"grammar","level":"A1","topic":"t","question":"q",
            "options":["a","b","c","d"],"correct":7}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }
}
