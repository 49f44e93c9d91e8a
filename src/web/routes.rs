use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(super::handlers::chat::index))

        // API endpoints
        .route(super::handlers::chat::QUERY_ENDPOINT, post(super::handlers::api::query))
        .route("/api/chat", post(super::handlers::api::query))

        // Health and diagnostics
        .route("/health", get(super::handlers::health::health_check))
        .route("/diagnostics", get(super::handlers::diagnostics::report))

        // Unmatched paths and methods still answer in JSON
        .fallback(super::handlers::fallback::not_found)
        .method_not_allowed_fallback(super::handlers::fallback::method_not_allowed)

        .with_state(state)
}
