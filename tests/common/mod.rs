#![allow(dead_code)]

use async_trait::async_trait;
use chatbot_bridge::services::backend::QueryBackend;
use chatbot_bridge::services::env_file::{self, parse};
use chatbot_bridge::types::{AppError, AppResult, QueryRequest, QueryResponse};
use chatbot_bridge::{AppState, Config};
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

/// Config with a fresh key rooted in `dir`, plus any extra env lines.
pub fn config(dir: &Path, extra: &str) -> Config {
    let source = format!("APP_KEY={}\n{}", env_file::generate_app_key(), extra);
    let env_path = dir.join(".env");
    std::fs::write(&env_path, &source).unwrap();
    Config::from_env_map(&parse(&source), &env_path).unwrap()
}

/// Backend that records queries and answers from a closure.
pub struct ScriptedBackend {
    pub seen: Mutex<Vec<QueryRequest>>,
    answer: Box<dyn Fn(&str) -> AppResult<QueryResponse> + Send + Sync>,
}

impl ScriptedBackend {
    pub fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            answer: Box::new(move |_| Ok(QueryResponse::reply(reply))),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            answer: Box::new(|_| Err(AppError::backend("upstream timed out"))),
        })
    }

    /// Panics inside `answer`, like a bug deep in backend code would.
    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            answer: Box::new(|_| panic!("backend blew up")),
        })
    }

    pub fn seen(&self) -> Vec<QueryRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    async fn answer(&self, query: &QueryRequest) -> AppResult<QueryResponse> {
        self.seen.lock().unwrap().push(query.clone());
        (self.answer)(&query.text)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn state(dir: &Path, extra: &str, backend: Arc<ScriptedBackend>) -> AppState {
    AppState::with_backend(config(dir, extra), backend).unwrap()
}
