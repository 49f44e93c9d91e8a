//! Environment diagnostics endpoint

use crate::services::diagnostics::{self, DiagnosticsReport};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

pub async fn report(State(state): State<AppState>) -> (StatusCode, Json<DiagnosticsReport>) {
    let config = state.config.clone();
    let report = tokio::task::spawn_blocking(move || diagnostics::run(&config))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Diagnostics task failed: {}", e);
            DiagnosticsReport {
                passed: false,
                checks: Vec::new(),
            }
        });

    let status = if report.passed {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
