pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Submission
        .route("/api/v1/analyses", post(handlers::handle_submit_document))
        .route("/api/v1/analyses/text", post(handlers::handle_submit_text))
        // Session
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/rewrites/:index/apply",
            post(handlers::handle_apply_rewrite),
        )
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
