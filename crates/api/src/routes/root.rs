use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn root_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let connection = if state.services.store_available() {
        "Connected"
    } else {
        "NOT CONNECTED"
    };

    Json(json!({
        "message": "Welcome to Dental Quest API!",
        "environment_variables_status": {
            "DB_URL_IS_SET": state.env.db_url_set,
            "DB_NAME_IS_SET": state.env.db_name_set,
            "AI_API_KEY_IS_SET": state.env.ai_key_set,
        },
        "database_connection_state": connection,
    }))
}
