mod ids;
mod level;
mod question;
mod report;
pub(crate) mod score;

pub use ids::{QuestionId, SessionId};
pub use level::{Level, LevelError, LevelInfo};
pub use question::{
    Choice, DEFAULT_TOPIC, OPTION_COUNT, Question, QuestionDraft, QuestionError, QuestionKind,
    QuestionSlot,
};
pub use report::{Report, WeakArea};
pub use score::{CategoryStats, Performance, ScoreResult, TopicStats};
