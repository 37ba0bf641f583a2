use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use quest_core::grading::QuizOutcome;
use quest_core::model::{UserId, UserProgress};
use services::QuizSubmission;

use crate::{error::ApiError, state::AppState};

pub async fn submit_quiz_handler(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<QuizOutcome>, ApiError> {
    let outcome = state
        .services
        .quiz()
        .submit(&submission)
        .await
        .map_err(|e| ApiError::from_quiz("submit_quiz", e))?;
    Ok(Json(outcome))
}

pub async fn user_progress_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserProgress>>, ApiError> {
    let records = state
        .services
        .quiz()
        .progress_for_user(&UserId::new(id))
        .await
        .map_err(|e| ApiError::from_quiz("get_user_progress", e))?;
    Ok(Json(records))
}
