mod generation;
mod outcome;
mod plan;
mod progress;
mod service;
mod snapshot;
mod state;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use outcome::{ReportStatus, TestOutcome};
pub use plan::GenerationPlan;
pub use progress::{TestProgress, TestStatistics};
pub use service::TestSession;
pub use snapshot::SessionSnapshot;
pub use state::SessionState;
