use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
};

pub const QUERY_ENDPOINT: &str = "/api/query";

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    state
        .templates
        .render_chat_page(&state.config.chat_title, QUERY_ENDPOINT)
        .map(Html)
        .map_err(|e| {
            tracing::error!("Template error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
