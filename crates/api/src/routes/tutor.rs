use std::sync::Arc;

use axum::{Json, extract::State};

use services::{TutorQuery, TutorReply};

use crate::{error::ApiError, state::AppState};

pub async fn ask_tutor_handler(
    State(state): State<Arc<AppState>>,
    Json(query): Json<TutorQuery>,
) -> Result<Json<TutorReply>, ApiError> {
    let reply = state
        .services
        .tutor()
        .ask(&query)
        .await
        .map_err(ApiError::from_tutor)?;
    Ok(Json(reply))
}
