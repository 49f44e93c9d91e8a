//! Typed error for the bridge.
//!
//! Every failure the pipeline can produce is an [`AppError`]. Translation to a
//! transport payload happens in one place ([`AppError::to_payload`]) so that no
//! exit path can leak raw, unstructured output.

use axum::http::StatusCode;
use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Number of backtrace frames reported in debug payloads.
pub const TRACE_FRAMES: usize = 10;

/// Coarse error classes, one per failure domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing dependencies, unwritable storage, unusable configuration file.
    Startup,
    /// A configuration value is missing or invalid.
    Config,
    /// Filesystem or socket failure.
    Io,
    /// The request did not carry a usable query.
    Validation,
    /// No route for the path.
    NotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// The body exceeded the transport limit.
    PayloadTooLarge,
    /// The query backend failed or answered with garbage.
    Backend,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Config => "config",
            Self::Io => "io",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Backend => "backend",
            Self::Internal => "internal",
        }
    }

    /// Raised by a bad request rather than a fault on this side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation | Self::NotFound | Self::MethodNotAllowed | Self::PayloadTooLarge
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    location: &'static Location<'static>,
    frames: Vec<String>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        // Client mistakes are routine; skip the backtrace walk for them.
        let frames = if kind.is_client_error() {
            Vec::new()
        } else {
            capture_frames(TRACE_FRAMES)
        };

        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
            frames,
        }
    }

    #[track_caller]
    pub fn startup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Startup, message)
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    #[track_caller]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `file:line` where the error was raised.
    pub fn location(&self) -> String {
        format!("{}:{}", self.location.file(), self.location.line())
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::Backend => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to an end user.
    pub fn public_message(&self) -> &str {
        match self.kind {
            ErrorKind::Validation => &self.message,
            ErrorKind::NotFound => "Not Found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::PayloadTooLarge => "Request body is too large.",
            ErrorKind::Backend => "The assistant is unavailable right now.",
            ErrorKind::Startup | ErrorKind::Config => "Server configuration error",
            ErrorKind::Io | ErrorKind::Internal => "Server Error",
        }
    }

    /// Build the structured error body. Diagnostic detail is attached only in
    /// debug mode.
    pub fn to_payload(&self, debug: bool) -> ErrorPayload {
        let mut payload = ErrorPayload {
            success: false,
            message: self.public_message().to_string(),
            error: None,
            location: None,
            kind: None,
            trace: None,
        };

        if debug {
            payload.error = Some(self.message.clone());
            payload.location = Some(self.location());
            payload.kind = Some(self.kind);
            payload.trace = Some(self.frames.clone());
        }

        payload
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Internal, format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(ErrorKind::Backend, err.to_string())
    }
}

/// Structured error body shared by both emission modes.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

fn capture_frames(limit: usize) -> Vec<String> {
    let trace = Backtrace::force_capture();
    if trace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }

    let rendered = trace.to_string();
    let frames: Vec<&str> = rendered
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.split_once(": ")
                .is_some_and(|(index, _)| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
        })
        .collect();

    // Start after the last frame belonging to error construction itself.
    let start = frames
        .iter()
        .rposition(|frame| is_construction_frame(frame))
        .map_or(0, |i| i + 1);

    frames[start..]
        .iter()
        .take(limit)
        .map(|frame| frame.to_string())
        .collect()
}

fn is_construction_frame(frame: &str) -> bool {
    frame.contains("types::errors::capture_frames") || frame.contains("types::errors::AppError")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_without_debug_hides_detail() {
        let err = AppError::internal("database exploded at /var/secret");
        let payload = err.to_payload(false);

        assert!(!payload.success);
        assert_eq!(payload.message, "Server Error");
        assert!(payload.error.is_none());
        assert!(payload.trace.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("location").is_none());
        assert!(!json.to_string().contains("/var/secret"));
    }

    #[test]
    fn test_debug_payload_carries_location_and_kind() {
        let err = AppError::backend("upstream returned 503");
        let payload = err.to_payload(true);

        assert_eq!(payload.error.as_deref(), Some("upstream returned 503"));
        assert_eq!(payload.kind, Some(ErrorKind::Backend));
        assert!(payload.location.unwrap().contains("errors.rs"));
        assert!(payload.trace.unwrap().len() <= TRACE_FRAMES);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::validation("x").status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::backend("x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::startup("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_is_public() {
        let err = AppError::validation("Please enter a message.");
        assert_eq!(err.public_message(), "Please enter a message.");
        assert!(err.to_payload(true).trace.unwrap().is_empty());
    }

    #[test]
    fn test_trace_starts_at_raising_site() {
        fn raise() -> AppError {
            AppError::internal("kaboom")
        }

        let trace = raise().to_payload(true).trace.unwrap();
        assert!(trace.len() <= TRACE_FRAMES);
        assert!(trace.iter().all(|frame| !is_construction_frame(frame)), "{:?}", trace);
    }

    #[test]
    fn test_construction_frames_are_recognized() {
        assert!(is_construction_frame("0: chatbot_bridge::types::errors::capture_frames"));
        assert!(is_construction_frame("2: chatbot_bridge::types::errors::AppError::internal"));
        assert!(is_construction_frame(
            "1: <chatbot_bridge::types::errors::AppError as core::convert::From<std::io::error::Error>>::from"
        ));
        assert!(!is_construction_frame("3: chatbot_bridge::services::backend::HttpBackend::new"));
    }

    #[test]
    fn test_request_level_kinds() {
        let err = AppError::new(ErrorKind::PayloadTooLarge, "length limit exceeded");
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.public_message(), "Request body is too large.");
        assert!(err.to_payload(true).trace.unwrap().is_empty());

        assert_eq!(AppError::new(ErrorKind::NotFound, "x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::new(ErrorKind::MethodNotAllowed, "x").status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_io_conversion() {
        fn read() -> AppResult<String> {
            Ok(std::fs::read_to_string("/definitely/not/here/.env")?)
        }

        let err = read().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!err.location().is_empty());
    }
}
