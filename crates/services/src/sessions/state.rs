use std::fmt;

/// Lifecycle of a `TestSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Generating,
    Active,
    Completed,
}

impl SessionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Generating => "generating",
            SessionState::Active => "active",
            SessionState::Completed => "completed",
        }
    }

    /// Whether a new test may be generated from this state.
    #[must_use]
    pub fn can_generate(self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Completed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds a session in `Generating` and restores the earlier state when dropped,
/// including when the generating future is cancelled.
pub(crate) struct GeneratingGuard<'a> {
    state: &'a mut SessionState,
    previous: SessionState,
}

impl<'a> GeneratingGuard<'a> {
    pub(crate) fn enter(state: &'a mut SessionState) -> Self {
        let previous = *state;
        *state = SessionState::Generating;
        Self { state, previous }
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        *self.state = self.previous;
    }
}
