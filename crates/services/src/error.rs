//! Shared error types for the services crate.

use thiserror::Error;

use quest_core::model::{LessonId, ProgressId, UserError, UserId};
use storage::repository::StorageError;

/// Errors emitted by `TutorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorError {
    #[error("AI tutor is not configured")]
    Disabled,
    #[error("AI tutor returned an empty response")]
    EmptyResponse,
    #[error("AI tutor request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("lesson {0} not found")]
    NotFound(LessonId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
    /// The progress record was written but the score increment was not.
    #[error("progress {progress_id} recorded but score was not applied: {source}")]
    ScoreNotApplied {
        progress_id: ProgressId,
        #[source]
        source: UserServiceError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UserServiceError {
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Unavailable))
    }
}

impl LessonServiceError {
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Unavailable))
    }
}

impl QuizError {
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            Self::Storage(StorageError::Unavailable) => true,
            Self::ScoreNotApplied { source, .. } => source.is_store_unavailable(),
            _ => false,
        }
    }
}
