//! HTTP surface for Dental Quest.
//!
//! Every route lives under `/api`. Handlers are thin: they decode the
//! request, call into `services`, and map service errors onto status codes
//! through [`error::ApiError`].

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub mod cors;
pub mod error;
pub mod routes;
pub mod state;

pub use state::{AppState, EnvStatus};

/// Build the full router with CORS and request tracing applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", get(routes::root::root_handler))
        .route("/api/", get(routes::root::root_handler))
        .route("/api/users", post(routes::users::create_user_handler))
        .route("/api/users/{id}", get(routes::users::get_user_handler))
        .route(
            "/api/users/{id}/progress",
            get(routes::quiz::user_progress_handler),
        )
        .route("/api/lessons", get(routes::lessons::list_lessons_handler))
        .route("/api/lessons/{id}", get(routes::lessons::get_lesson_handler))
        .route("/api/quiz/submit", post(routes::quiz::submit_quiz_handler))
        .route("/api/ai/ask", post(routes::tutor::ask_tutor_handler))
        .route(
            "/api/initialize-data",
            post(routes::lessons::initialize_data_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors::cors_layer())
        .with_state(state)
}
