use std::collections::BTreeMap;

use serde::Serialize;

use proficiency_core::model::Level;

/// Where the learner is within the current test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestProgress {
    /// 1-based position of the current question, 0 when there are none.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    /// Share of the test already passed, from the 0-based position.
    pub percentage: u8,
}

impl TestProgress {
    pub(crate) fn new(current_index: usize, total: usize, answered: usize) -> Self {
        let current = if total == 0 { 0 } else { current_index + 1 };
        let percentage = if total == 0 {
            0
        } else {
            u8::try_from(current_index * 100 / total).unwrap_or(100)
        };
        Self {
            current,
            total,
            answered,
            percentage,
        }
    }
}

/// Composition of the current test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStatistics {
    pub total: usize,
    pub grammar: usize,
    pub reading: usize,
    pub level_distribution: BTreeMap<Level, usize>,
    pub progress: TestProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_one_based_and_floored() {
        let p = TestProgress::new(0, 3, 1);
        assert_eq!(p.current, 1);
        assert_eq!(p.percentage, 0);
        let p = TestProgress::new(1, 3, 0);
        assert_eq!(p.current, 2);
        assert_eq!(p.answered, 0);
        assert_eq!(p.percentage, 33);
        assert_eq!(TestProgress::new(0, 0, 0).percentage, 0);
        assert_eq!(TestProgress::new(0, 0, 0).current, 0);
    }
}
