//! Chat widget model
//!
//! The client half of the bridge: a toggleable chat window that keeps a
//! transcript, posts each submission to the query endpoint and appends the
//! answer (or a fixed fallback) when the call completes.

mod client;
mod header;
mod input;
mod message;

pub use client::QueryClient;
pub use header::ChatHeader;
pub use input::ChatInput;
pub use message::{Author, ChatMessage};

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Shown in place of a reply whenever a query fails.
pub const FALLBACK_REPLY: &str = "Error! Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Only the toggle button is visible.
    Idle,
    /// Conversation is visible.
    Open,
}

pub struct ChatWidget {
    state: WidgetState,
    header: ChatHeader,
    input: ChatInput,
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
    client: QueryClient,
}

impl ChatWidget {
    pub fn new(client: QueryClient, header: ChatHeader) -> Self {
        Self {
            state: WidgetState::Idle,
            header,
            input: ChatInput::default(),
            transcript: Arc::new(RwLock::new(Vec::new())),
            client,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == WidgetState::Open
    }

    pub fn header(&self) -> &ChatHeader {
        &self.header
    }

    pub fn input_mut(&mut self) -> &mut ChatInput {
        &mut self.input
    }

    pub fn open(&mut self) {
        if self.state == WidgetState::Idle {
            tracing::debug!("Chat widget opened");
            self.state = WidgetState::Open;
        }
    }

    pub fn minimize(&mut self) {
        if self.state == WidgetState::Open {
            tracing::debug!("Chat widget minimized");
            self.state = WidgetState::Idle;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            WidgetState::Idle => self.open(),
            WidgetState::Open => self.minimize(),
        }
    }

    /// Snapshot of the conversation so far.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    /// Submit `text` while the widget is open.
    ///
    /// Blank text (or a closed widget) changes nothing and returns `None`.
    /// Otherwise the user message is appended right away and one background
    /// task asks the endpoint; its handle is returned. Submissions are not
    /// queued, so replies land in completion order.
    pub async fn submit(&self, text: &str) -> Option<JoinHandle<()>> {
        let text = text.trim();
        if text.is_empty() || !self.is_open() {
            return None;
        }

        self.transcript.write().await.push(ChatMessage::user(text));

        let client = self.client.clone();
        let transcript = self.transcript.clone();
        let text = text.to_string();
        Some(tokio::spawn(async move {
            let reply = match client.ask(&text).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!("Chat query failed: {}", e);
                    FALLBACK_REPLY.to_string()
                }
            };
            transcript.write().await.push(ChatMessage::bot(reply));
        }))
    }

    /// Submit whatever is in the input box.
    pub async fn send_draft(&mut self) -> Option<JoinHandle<()>> {
        if !self.is_open() {
            return None;
        }
        let text = self.input.take_submission()?;
        self.submit(&text).await
    }
}
