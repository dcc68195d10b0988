// ABOUTME: Text-completion provider abstraction used by the suggestion flows
// ABOUTME: Defines LlmProvider, chat message/request/response types and capability flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # LLM providers
//!
//! Flows treat the model as a text-completion collaborator. Anything that can
//! turn a list of [`ChatMessage`]s into a [`ChatResponse`] implements
//! [`LlmProvider`]; the flow layer never depends on a concrete backend.
//!
//! ```rust,no_run
//! use mealmate::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn ask(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("You are a nutrition coach."),
//!         ChatMessage::user("Suggest a light dinner."),
//!     ])
//!     .with_json_mode();
//!     let _ = provider.complete(&request).await;
//! }
//! ```

mod gemini;
mod json;
mod openai_compatible;
pub mod prompts;
mod provider;

pub use gemini::GeminiProvider;
pub use json::extract_json;
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use provider::ChatProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

bitflags::bitflags! {
    /// Features a provider backend supports
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Native JSON output mode
        const JSON_MODE = 0b0000_0001;
    }
}

impl LlmCapabilities {
    /// Whether the backend can be asked for JSON-only output
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

/// Map a transport failure to an error, treating connect and timeout failures as unavailability
pub(crate) fn transport_error(service: &str, error: &reqwest::Error) -> AppError {
    if error.is_connect() {
        AppError::service_unavailable(service, "Cannot connect to the service")
    } else if error.is_timeout() {
        AppError::service_unavailable(service, "Request timed out")
    } else {
        AppError::external_service(service, format!("Request failed: {error}"))
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions framing the conversation
    System,
    /// End-user (or flow) input
    User,
    /// Model output
    Assistant,
}

impl MessageRole {
    /// Wire name used by OpenAI-style APIs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote it
    pub role: MessageRole,
    /// Text content
    pub content: String,
}

impl ChatMessage {
    /// Message with an explicit role
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// System message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// User message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// A completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Output token cap
    pub max_tokens: Option<u32>,
    /// Ask the backend for JSON-only output when it supports it
    pub json_mode: bool,
}

impl ChatRequest {
    /// Request with default sampling settings
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap output tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request JSON-only output
    #[must_use]
    pub const fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// A completion result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text
    pub content: String,
    /// Model that produced it
    pub model: String,
    /// Token accounting, when reported
    pub usage: Option<TokenUsage>,
    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Token accounting for one completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Generated tokens
    pub completion_tokens: u32,
    /// Sum of both
    pub total_tokens: u32,
}

/// A text-completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable identifier (`groq`, `gemini`, ...)
    fn name(&self) -> &'static str;

    /// Human-readable name
    fn display_name(&self) -> &'static str;

    /// Supported features
    fn capabilities(&self) -> LlmCapabilities;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;

    /// Models this backend is known to serve
    fn available_models(&self) -> &'static [&'static str];

    /// Run one completion
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Check that the backend is reachable and the credentials work
    async fn health_check(&self) -> Result<bool, AppError>;
}
