use super::errors::{AppError, AppResult};
use super::request::NormalizedRequest;
use serde::{Deserialize, Serialize};

/// Field names accepted for the query text, in priority order.
pub const QUERY_FIELDS: [&str; 3] = ["query", "text", "message"];

/// Field names accepted for a pass-through auth token.
pub const TOKEN_FIELDS: [&str; 2] = ["auth_token", "token"];

/// A user question on its way to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl QueryRequest {
    pub fn new(text: &str, auth_token: Option<String>) -> AppResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Please enter a message."));
        }

        Ok(Self {
            text: text.to_string(),
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Pull the query out of a normalized request. A token from the
    /// transport (Authorization header) wins over one found in the fields.
    pub fn from_request(request: &NormalizedRequest, header_token: Option<String>) -> AppResult<Self> {
        let text = request.first_of(&QUERY_FIELDS).unwrap_or_default();
        let token = header_token.or_else(|| request.first_of(&TOKEN_FIELDS).map(str::to_string));
        Self::new(text, token)
    }
}

/// What the backend wire format looks like on the way out.
#[derive(Debug, Serialize)]
pub struct BackendQuery<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResponse {
    pub fn reply(reply: impl Into<String>) -> Self {
        Self {
            success: true,
            reply: Some(reply.into()),
            message: None,
        }
    }

    /// A declined query. The message is shown to the user as-is.
    pub fn declined(message: Option<String>) -> Self {
        Self {
            success: false,
            reply: None,
            message,
        }
    }

    /// Read a backend body. A body with `"success": false` is forwarded with
    /// its message; otherwise a reply (or one of its aliases) is required.
    pub fn from_upstream(body: &serde_json::Value) -> Option<Self> {
        if body.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            return Some(Self::declined(message));
        }

        extract_reply(body).map(Self::reply)
    }
}

/// Extract the textual answer from a backend JSON body.
///
/// `reply` is the canonical field; `message`, `text` and `answer` are
/// accepted as equivalents. A body with `"success": false` carries no reply.
pub fn extract_reply(body: &serde_json::Value) -> Option<String> {
    if body.get("success").and_then(|v| v.as_bool()) == Some(false) {
        return None;
    }

    ["reply", "message", "text", "answer"]
        .iter()
        .filter_map(|key| body.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .next()
}
