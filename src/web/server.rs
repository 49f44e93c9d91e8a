use crate::state::AppState;
use crate::types::AppError;
use crate::web::bridge::{error_response, panic_error};
use axum::response::Response;
use axum::Router;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Web server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let cors = crate::web::middleware::cors_layer(&state.config.cors_origins);
    let debug = state.config.debug;
    Router::new()
        .merge(crate::web::routes::create_routes(state))
        .layer(CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| -> Response {
            error_response(&panic_error(payload.as_ref()), debug)
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Router used when startup failed: every request gets the structured 500.
pub fn failure_app(error: AppError, debug: bool) -> Router {
    let error = Arc::new(error);
    Router::new()
        .fallback(move || {
            let error = error.clone();
            async move { error_response(&error, debug) }
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn start_failure_server(addr: &str, error: AppError, debug: bool) -> anyhow::Result<()> {
    tracing::error!("Startup failed, serving error responses only: {}", error);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Fallback server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, failure_app(error, debug)).await?;
    Ok(())
}
