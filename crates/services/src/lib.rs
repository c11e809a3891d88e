#![forbid(unsafe_code)]

pub mod ai;
pub mod error;
pub mod sessions;

pub use proficiency_core::Clock;

pub use ai::{GeminiClient, GeminiConfig, GeminiGenerator, ProficiencyGenerator, ReadingExercise, ReportRequest};
pub use error::{AiError, SessionError};
pub use sessions::{
    GenerationPlan, ReportStatus, SessionSnapshot, SessionState, TestOutcome, TestProgress,
    TestSession, TestStatistics,
};
