use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use services::{LessonServiceError, QuizError, TutorError, UserServiceError};

/// Handler-level failure, rendered as `{"detail": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database connection is not available.")]
    StoreUnavailable,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn internal(op: &str, err: impl std::fmt::Display) -> Self {
        error!(op, error = %err, "request failed");
        ApiError::Internal(format!("Error in {op}: {err}"))
    }

    pub fn from_user(op: &str, err: UserServiceError) -> Self {
        if err.is_store_unavailable() {
            return ApiError::StoreUnavailable;
        }
        match err {
            UserServiceError::NotFound(_) => ApiError::NotFound("User not found"),
            UserServiceError::User(e) => ApiError::BadRequest(e.to_string()),
            other => Self::internal(op, other),
        }
    }

    pub fn from_lesson(op: &str, err: LessonServiceError) -> Self {
        if err.is_store_unavailable() {
            return ApiError::StoreUnavailable;
        }
        match err {
            LessonServiceError::NotFound(_) => ApiError::NotFound("Lesson not found"),
            other => Self::internal(op, other),
        }
    }

    pub fn from_quiz(op: &str, err: QuizError) -> Self {
        if err.is_store_unavailable() {
            return ApiError::StoreUnavailable;
        }
        match err {
            QuizError::LessonNotFound(_) => ApiError::NotFound("Lesson not found"),
            other => Self::internal(op, other),
        }
    }

    pub fn from_tutor(err: TutorError) -> Self {
        error!(error = %err, "AI tutor request failed");
        ApiError::Internal(format!("An AI error occurred: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
