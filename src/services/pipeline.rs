//! Query pipeline: normalized request in, typed result out.

use crate::services::backend::QueryBackend;
use crate::types::{AppResult, NormalizedRequest, QueryRequest, QueryResponse};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct QueryPipeline {
    backend: Arc<dyn QueryBackend>,
}

impl QueryPipeline {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Validate the request and ask the backend. Handlers never write output
    /// themselves; they get a value back and hand it to the response bridge.
    pub async fn run(
        &self,
        request: &NormalizedRequest,
        header_token: Option<String>,
    ) -> AppResult<QueryResponse> {
        let query = QueryRequest::from_request(request, header_token)?;

        tracing::info!(
            "Query from {:?} ({} chars) -> {} backend",
            request.source(),
            query.text.len(),
            self.backend.name()
        );

        let started = Instant::now();
        let result = self.backend.answer(&query).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(response) => {
                if response.success {
                    tracing::debug!("Backend replied in {}ms", elapsed_ms);
                } else {
                    tracing::info!("Backend declined the query after {}ms", elapsed_ms);
                }
                Ok(response)
            }
            Err(e) => {
                tracing::error!("Backend failed after {}ms: {}", elapsed_ms, e);
                Err(e)
            }
        }
    }
}
