use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use quest_core::model::{User, UserId};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

/// Registers a learner, or returns the existing one for that email.
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUser>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .users()
        .create_or_get(payload.username, payload.email)
        .await
        .map_err(|e| ApiError::from_user("create_user", e))?;
    Ok(Json(user))
}

pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .services
        .users()
        .get_user(&UserId::new(id))
        .await
        .map_err(|e| ApiError::from_user("get_user", e))?;
    Ok(Json(user))
}
