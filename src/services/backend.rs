//! Query backends
//!
//! The backend is the opaque collaborator that turns a question into an
//! answer. Only its HTTP contract is known: `{ "query": ... }` in,
//! `{ "reply": ... }` out.

use crate::config::Config;
use crate::types::message::BackendQuery;
use crate::types::{AppError, AppResult, QueryRequest, QueryResponse};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Answer one query. A declined query is an `Ok` response with
    /// `success: false`; errors are reserved for a failing backend.
    async fn answer(&self, query: &QueryRequest) -> AppResult<QueryResponse>;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Forwards queries to an upstream HTTP endpoint.
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::startup(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn answer(&self, query: &QueryRequest) -> AppResult<QueryResponse> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&BackendQuery { query: &query.text });
        if let Some(token) = &query.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::backend(format!("Upstream answered with HTTP {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::backend(format!("Upstream sent malformed JSON: {}", e)))?;

        QueryResponse::from_upstream(&body)
            .ok_or_else(|| AppError::backend("Upstream response carried no reply"))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Answers every query with a fixed notice. Used when no upstream is
/// configured so the widget still gets a well-formed reply.
pub struct OfflineBackend {
    reply: String,
}

pub const OFFLINE_REPLY: &str =
    "Our assistant is offline at the moment. Please leave your question and we will get back to you.";

impl OfflineBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new(OFFLINE_REPLY)
    }
}

#[async_trait]
impl QueryBackend for OfflineBackend {
    async fn answer(&self, query: &QueryRequest) -> AppResult<QueryResponse> {
        tracing::debug!("Offline backend answering {} char query", query.text.len());
        Ok(QueryResponse::reply(self.reply.clone()))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Pick the backend the configuration asks for.
pub fn from_config(config: &Config) -> AppResult<Arc<dyn QueryBackend>> {
    match &config.backend_url {
        Some(url) => {
            tracing::info!("Query backend: {}", url);
            Ok(Arc::new(HttpBackend::new(url.clone(), config.backend_timeout())?))
        }
        None => {
            tracing::warn!("QUERY_BACKEND_URL is not set; answering with the offline backend");
            Ok(Arc::new(OfflineBackend::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn query(text: &str, token: Option<&str>) -> QueryRequest {
        QueryRequest::new(text, token.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_http_backend_forwards_query_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_header("authorization", "Bearer wp-nonce")
            .match_body(Matcher::Json(json!({"query": "track my order"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "reply": "Your order is on the way"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/query", server.url()), Duration::from_secs(5)).unwrap();
        let reply = backend.answer(&query("track my order", Some("wp-nonce"))).await.unwrap();

        assert_eq!(reply, QueryResponse::reply("Your order is on the way"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_backend_maps_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/query", server.url()), Duration::from_secs(5)).unwrap();
        let err = backend.answer(&query("hi", None)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.message().contains("500"));
    }

    #[tokio::test]
    async fn test_http_backend_forwards_declined_query() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "Order #1234 was not found"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/query", server.url()), Duration::from_secs(5)).unwrap();
        let response = backend.answer(&query("where is order 1234", None)).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Order #1234 was not found"));
        assert_eq!(response.reply, None);
    }

    #[tokio::test]
    async fn test_http_backend_rejects_reply_less_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "status": "queued"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/query", server.url()), Duration::from_secs(5)).unwrap();
        let err = backend.answer(&query("hi", None)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[tokio::test]
    async fn test_offline_backend() {
        let backend = OfflineBackend::default();
        assert_eq!(
            backend.answer(&query("hi", None)).await.unwrap(),
            QueryResponse::reply(OFFLINE_REPLY)
        );
        assert_eq!(backend.name(), "offline");
    }
}
