use std::time::Duration;

use proficiency_core::model::Level;

/// What a session asks the remote generator for, and how long each call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    /// Grammar levels requested in order, one call each.
    pub grammar_levels: Vec<Level>,
    pub grammar_per_level: usize,
    /// Reading levels requested in order, one call each.
    pub reading_levels: Vec<Level>,
    pub passages_per_level: usize,
    /// Upper bound on reading questions kept.
    pub reading_target: usize,
    /// Extra level asked once when the reading set falls short of `reading_target`.
    pub reading_top_up: Option<Level>,
    pub call_deadline: Duration,
}

impl Default for GenerationPlan {
    fn default() -> Self {
        Self {
            grammar_levels: Level::ALL.to_vec(),
            grammar_per_level: 5,
            reading_levels: vec![Level::B1, Level::B2],
            passages_per_level: 1,
            reading_target: 5,
            reading_top_up: Some(Level::B1),
            call_deadline: Duration::from_secs(45),
        }
    }
}

impl GenerationPlan {
    /// Number of remote calls made before any top-up.
    #[must_use]
    pub fn base_calls(&self) -> usize {
        self.grammar_levels.len() + self.reading_levels.len()
    }

    #[must_use]
    pub fn with_call_deadline(mut self, deadline: Duration) -> Self {
        self.call_deadline = deadline;
        self
    }
}
