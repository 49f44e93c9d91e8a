//! Response bridge
//!
//! The last step of every request. Handlers produce a typed result; the
//! bridge turns it into either an HTTP response (standalone) or a raw string
//! for an embedding host. Incidental output collected during the request is
//! dropped on every path.

use crate::types::{AppError, AppResult, ErrorKind, QueryResponse};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Return the body to an in-process host; it owns status and headers.
    Embedded,
    /// Answer over HTTP.
    Standalone,
}

/// What [`ResponseBridge::emit`] hands back. A raw body is for the host and
/// never becomes an HTTP response on its own.
pub enum Emitted {
    Raw(String),
    Http(Response),
}

/// Sink for text that is not part of the response, e.g. notices from code
/// the host runs in the same process. Never forwarded.
#[derive(Debug, Default)]
pub struct IncidentalOutput {
    buf: Vec<u8>,
}

impl IncidentalOutput {
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn discard(&mut self) -> usize {
        let n = self.buf.len();
        self.buf.clear();
        n
    }
}

impl io::Write for IncidentalOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

type TerminateHook = Box<dyn FnOnce() + Send>;

pub struct ResponseBridge {
    debug: bool,
    incidental: IncidentalOutput,
    on_terminate: Vec<TerminateHook>,
}

impl ResponseBridge {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            incidental: IncidentalOutput::default(),
            on_terminate: Vec::new(),
        }
    }

    pub fn incidental(&mut self) -> &mut IncidentalOutput {
        &mut self.incidental
    }

    /// Register cleanup to run after a standalone response is built.
    pub fn on_terminate(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.on_terminate.push(Box::new(hook));
    }

    pub fn emit(self, result: AppResult<QueryResponse>, mode: Mode) -> Emitted {
        match mode {
            Mode::Embedded => Emitted::Raw(self.emit_embedded(result)),
            Mode::Standalone => Emitted::Http(self.emit_standalone(result)),
        }
    }

    /// JSON body only, no status or headers.
    pub fn emit_embedded(mut self, result: AppResult<QueryResponse>) -> String {
        self.drop_incidental();
        let (_, body) = render(result, self.debug);
        body
    }

    pub fn emit_standalone(mut self, result: AppResult<QueryResponse>) -> Response {
        self.drop_incidental();
        let (status, body) = render(result, self.debug);
        let response = json_response(status, body);

        for hook in self.on_terminate.drain(..) {
            hook();
        }

        response
    }

    fn drop_incidental(&mut self) {
        let discarded = self.incidental.discard();
        if discarded > 0 {
            tracing::debug!("Discarded {} byte(s) of incidental output", discarded);
        }
    }
}

/// Translate a pipeline result into a status and JSON body.
pub fn render(result: AppResult<QueryResponse>, debug: bool) -> (StatusCode, String) {
    match result {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => render_error(&AppError::from(e), debug),
        },
        Err(e) => render_error(&e, debug),
    }
}

pub fn render_error(error: &AppError, debug: bool) -> (StatusCode, String) {
    let body = serde_json::to_string(&error.to_payload(debug))
        .unwrap_or_else(|_| r#"{"success":false,"message":"Server Error"}"#.to_string());
    (error.status(), body)
}

/// Structured HTTP response for an error raised outside a handler body,
/// e.g. a rejected extractor or a missing route.
pub fn error_response(error: &AppError, debug: bool) -> Response {
    let (status, body) = render_error(error, debug);
    json_response(status, body)
}

/// Turn a caught panic into an internal error.
pub fn panic_error(payload: &(dyn Any + Send)) -> AppError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    tracing::error!("Request handling panicked: {}", detail);
    AppError::new(ErrorKind::Internal, format!("panic: {}", detail))
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
