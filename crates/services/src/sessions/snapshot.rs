use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use proficiency_core::model::{Choice, Question};

/// Serialisable copy of a session's test data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub questions: Vec<Question>,
    pub answers: Vec<Option<Choice>>,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub offline: bool,
}

impl SessionSnapshot {
    /// Number of positions with an answer recorded.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }
}
