//! Shared error types for the services crate.

use quiz_core::model::QuizId;
use thiserror::Error;

/// Coarse classification used by callers that only care whether the user has
/// to re-authenticate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    Transport,
}

/// Errors emitted by a `QuizDataSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSourceError {
    #[error("not authorized to read quiz data")]
    Unauthorized,
    #[error("quiz {0} not found")]
    NotFound(QuizId),
    #[error("quiz request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid quiz api base url: {0}")]
    InvalidBaseUrl(String),
    #[error("quiz source unavailable: {0}")]
    Unavailable(String),
}

impl QuizSourceError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            QuizSourceError::Unauthorized => FailureKind::Unauthorized,
            _ => FailureKind::Transport,
        }
    }
}

/// Errors emitted while loading a quiz fixture file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FixtureError {
    #[error("cannot read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed fixture: {0}")]
    Json(#[from] serde_json::Error),
}
