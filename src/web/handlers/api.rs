//! Query API endpoint

use crate::services::adapter;
use crate::state::AppState;
use crate::types::{AppError, ErrorKind, TransportInput};
use crate::web::bridge::ResponseBridge;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Answer one query posted as JSON or form data.
pub async fn query(
    State(state): State<AppState>,
    RawQuery(query_string): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::now_v7();
    let started = Instant::now();

    let mut bridge = ResponseBridge::new(state.config.debug);
    bridge.on_terminate(move || {
        tracing::info!("[{}] Query handled in {}ms", request_id, started.elapsed().as_millis());
    });

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!("[{}] Rejected request body: {}", request_id, rejection.body_text());
            return bridge.emit_standalone(Err(body_error(&rejection)));
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let transport = TransportInput::new(content_type, query_string.unwrap_or_default(), body.to_vec());
    let request = adapter::from_transport(transport);
    tracing::debug!("[{}] {} field(s) via {}", request_id, request.body().len(), request.content_type());

    let result = state.pipeline.run(&request, bearer_token(&headers)).await;
    bridge.emit_standalone(result)
}

fn body_error(rejection: &BytesRejection) -> AppError {
    let kind = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorKind::PayloadTooLarge
    } else {
        ErrorKind::Validation
    };
    AppError::new(kind, rejection.body_text())
}

/// Token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
