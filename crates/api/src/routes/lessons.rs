use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use quest_core::model::{Lesson, LessonId};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct LessonFilter {
    pub level: Option<u32>,
}

pub async fn list_lessons_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LessonFilter>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let lessons = state
        .services
        .lessons()
        .list_lessons(filter.level)
        .await
        .map_err(|e| ApiError::from_lesson("list_lessons", e))?;
    Ok(Json(lessons))
}

pub async fn get_lesson_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Lesson>, ApiError> {
    let lesson = state
        .services
        .lessons()
        .get_lesson(&LessonId::new(id))
        .await
        .map_err(|e| ApiError::from_lesson("get_lesson", e))?;
    Ok(Json(lesson))
}

/// Wipes the catalog and installs the sample lessons.
pub async fn initialize_data_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    state
        .services
        .lessons()
        .reseed()
        .await
        .map_err(|e| match e {
            e if e.is_store_unavailable() => ApiError::StoreUnavailable,
            e => ApiError::Internal(format!("Failed to initialize data: {e}")),
        })?;
    Ok(Json(json!({ "message": "Sample data initialized successfully" })))
}
