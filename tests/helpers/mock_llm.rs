// ABOUTME: Scripted language model for flow and route tests
// ABOUTME: Replays queued completions or errors and records every request it receives

use async_trait::async_trait;
use mealmate::errors::AppError;
use mealmate::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted reply
pub enum MockReply {
    /// Completion text
    Text(String),
    /// Provider failure
    Error(String),
}

/// `LlmProvider` that answers from a queue
#[derive(Default)]
pub struct MockLlmProvider {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlmProvider {
    /// Provider replying with `replies` in order; errors once the queue is empty
    pub fn new(replies: Vec<MockReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Provider replying with each JSON value in turn
    pub fn with_json(values: &[serde_json::Value]) -> Arc<Self> {
        Self::new(values.iter().map(|v| MockReply::Text(v.to_string())).collect())
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received, oldest first
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Mock"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::JSON_MODE
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["mock-model"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Text(content)) => Ok(ChatResponse {
                content,
                model: "mock-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Some(MockReply::Error(message)) => Err(AppError::external_service("mock", message)),
            None => Err(AppError::external_service("mock", "no scripted reply left")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
