//! Structured answers for requests no route accepts

use crate::state::AppState;
use crate::types::{AppError, ErrorKind};
use crate::web::bridge::error_response;
use axum::{
    extract::State,
    http::{Method, Uri},
    response::Response,
};

pub async fn not_found(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let error = AppError::new(ErrorKind::NotFound, format!("No route for {} {}", method, uri.path()));
    error_response(&error, state.config.debug)
}

pub async fn method_not_allowed(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let error = AppError::new(
        ErrorKind::MethodNotAllowed,
        format!("{} is not allowed on {}", method, uri.path()),
    );
    error_response(&error, state.config.debug)
}
