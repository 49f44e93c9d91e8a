//! HTTP client the widget uses to reach the query endpoint.

use crate::types::message::BackendQuery;
use crate::types::{extract_reply, AppError, AppResult};

#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl QueryClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// Send this token as a Bearer credential on every query.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `{ "query": text }` and return the reply text. Non-2xx statuses,
    /// malformed JSON and bodies without a reply are all errors.
    pub async fn ask(&self, text: &str) -> AppResult<String> {
        let mut request = self.http.post(&self.endpoint).json(&BackendQuery { query: text });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::backend(format!("Query endpoint answered with HTTP {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::backend(format!("Malformed reply: {}", e)))?;

        extract_reply(&body).ok_or_else(|| AppError::backend("Reply field missing"))
    }
}
