//! Shared error types for the services crate.

use thiserror::Error;

use crate::sessions::SessionState;

/// Errors emitted by the remote generation capability.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI generation is not configured")]
    Disabled,
    #[error("AI quota exceeded")]
    QuotaExceeded,
    #[error("AI request failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("AI returned an empty response")]
    EmptyResponse,
    #[error("AI response is not valid JSON: {0}")]
    MalformedResponse(String),
    #[error("AI request timed out")]
    Timeout,
}

impl AiError {
    /// Whether this failure means the usage limit is exhausted and retrying is pointless.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, AiError::QuotaExceeded)
    }
}

/// Errors emitted by `TestSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("no current question to answer")]
    NoCurrentQuestion,
    #[error("test is not complete: {unanswered} question(s) unanswered")]
    Incomplete { unanswered: usize },
    #[error("snapshot has {questions} questions but {answers} answers")]
    SnapshotMismatch { questions: usize, answers: usize },
    #[error("no questions available for a test")]
    Empty,
    #[error(transparent)]
    Ai(#[from] AiError),
}
