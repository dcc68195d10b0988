// ABOUTME: Chat-completions client for Groq, OpenAI and local OpenAI-compatible servers
// ABOUTME: Maps the shared ChatRequest onto /chat/completions and HTTP errors onto AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # `OpenAI`-compatible provider
//!
//! One client covers every backend that speaks the `/chat/completions`
//! dialect. Presets exist for:
//!
//! - **Groq** (`GROQ_API_KEY`), the default backend
//! - **`OpenAI`** (`OPENAI_API_KEY`)
//! - **Local** Ollama/vLLM servers (`LOCAL_LLM_BASE_URL`, no key required)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{
    transport_error, ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

/// Groq API key variable
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
/// `OpenAI` API key variable
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Local server base URL variable
pub const LOCAL_LLM_BASE_URL_ENV: &str = "LOCAL_LLM_BASE_URL";
/// Optional key for local servers behind a proxy
const LOCAL_LLM_API_KEY_ENV: &str = "LOCAL_LLM_API_KEY";

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const LOCAL_BASE_URL: &str = "http://localhost:11434/v1";
const LOCAL_DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

const CONNECT_TIMEOUT_SECS: u64 = 15;
/// Local inference can be slow on laptops
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Connection settings for one `OpenAI`-compatible backend
#[derive(Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL up to and including the version segment
    pub base_url: String,
    /// Bearer token, optional for local servers
    pub api_key: Option<String>,
    /// Model used when the request does not name one
    pub default_model: String,
    /// Stable identifier reported by [`LlmProvider::name`]
    pub provider_name: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
    /// Supported features
    pub capabilities: LlmCapabilities,
    /// Known models
    pub models: &'static [&'static str],
}

impl std::fmt::Debug for OpenAiCompatibleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_model", &self.default_model)
            .field("provider_name", &self.provider_name)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleConfig {
    /// Groq cloud inference
    #[must_use]
    pub fn groq(api_key: String, model: Option<String>) -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_owned(),
            api_key: Some(api_key),
            default_model: model.unwrap_or_else(|| GROQ_DEFAULT_MODEL.to_owned()),
            provider_name: "groq",
            display_name: "Groq",
            capabilities: LlmCapabilities::JSON_MODE,
            models: &[
                "llama-3.3-70b-versatile",
                "llama-3.1-8b-instant",
                "mixtral-8x7b-32768",
                "gemma2-9b-it",
            ],
        }
    }

    /// `OpenAI` hosted models
    #[must_use]
    pub fn openai(api_key: String, model: Option<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            api_key: Some(api_key),
            default_model: model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_owned()),
            provider_name: "openai",
            display_name: "OpenAI",
            capabilities: LlmCapabilities::JSON_MODE,
            models: &["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini"],
        }
    }

    /// Ollama, vLLM or any local server exposing `/chat/completions`
    #[must_use]
    pub fn local(base_url: String, api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            default_model: model.unwrap_or_else(|| LOCAL_DEFAULT_MODEL.to_owned()),
            provider_name: "local",
            display_name: "Local LLM",
            capabilities: LlmCapabilities::empty(),
            models: &[
                "qwen2.5:14b-instruct",
                "qwen2.5:7b-instruct",
                "llama3.1:8b-instruct",
                "mistral:7b-instruct",
            ],
        }
    }
}

/// Client for an `OpenAI`-compatible chat-completions endpoint
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Build a provider for `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing {} provider: base_url={}, model={}",
            config.display_name, config.base_url, config.default_model
        );
        Ok(Self { client, config })
    }

    /// Groq provider from `GROQ_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns a config error if the key is missing
    pub fn groq_from_env(model: Option<String>) -> Result<Self, AppError> {
        let api_key = required_env(GROQ_API_KEY_ENV, "Groq")?;
        Self::new(OpenAiCompatibleConfig::groq(api_key, model))
    }

    /// `OpenAI` provider from `OPENAI_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns a config error if the key is missing
    pub fn openai_from_env(model: Option<String>) -> Result<Self, AppError> {
        let api_key = required_env(OPENAI_API_KEY_ENV, "OpenAI")?;
        Self::new(OpenAiCompatibleConfig::openai(api_key, model))
    }

    /// Local provider from `LOCAL_LLM_BASE_URL` (Ollama on localhost by default)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn local_from_env(model: Option<String>) -> Result<Self, AppError> {
        let base_url = env::var(LOCAL_LLM_BASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| LOCAL_BASE_URL.to_owned());
        let api_key = env::var(LOCAL_LLM_API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Self::new(OpenAiCompatibleConfig::local(base_url, api_key, model))
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }

    fn build_request<'a>(&'a self, request: &'a ChatRequest) -> OpenAiRequest<'a> {
        let json_mode = request.json_mode && self.config.capabilities.supports_json_mode();
        OpenAiRequest {
            model: &self.config.default_model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    fn parse_error_response(&self, status: reqwest::StatusCode, body: &str) -> AppError {
        let service = self.config.display_name;
        let Ok(parsed) = serde_json::from_str::<OpenAiErrorResponse>(body) else {
            return match status.as_u16() {
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    "LLM rate limit reached. Please wait a moment and try again.",
                ),
                502..=504 => {
                    AppError::service_unavailable(service, format!("{service} is not responding"))
                }
                _ => AppError::external_service(
                    service,
                    format!(
                        "API error ({status}): {}",
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            };
        };

        let message = parsed.error.message;
        match status.as_u16() {
            401 | 403 => AppError::auth_invalid(format!("{service} authentication failed: {message}")),
            429 => AppError::new(ErrorCode::ExternalRateLimited, format!("{service}: {message}")),
            400 => AppError::invalid_input(format!("{service} rejected the request: {message}")),
            404 => AppError::not_found(format!("{service} model or endpoint ({message})")),
            _ => AppError::external_service(
                service,
                format!(
                    "{} - {message}",
                    parsed.error.error_type.as_deref().unwrap_or("unknown")
                ),
            ),
        }
    }
}

fn required_env(key: &str, service: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("{key} is required for the {service} provider")))
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.provider_name
    }

    fn display_name(&self) -> &'static str {
        self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        self.config.models
    }

    #[instrument(skip(self, request), fields(provider = self.config.provider_name, model = %self.config.default_model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let body = self.build_request(request);
        debug!(
            messages = body.messages.len(),
            json_mode = body.response_format.is_some(),
            "Sending chat completion request"
        );

        let http_request = self.client.post(self.api_url("chat/completions")).json(&body);
        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!(base_url = %self.config.base_url, "Failed to send request to {}: {e}", self.config.provider_name);
                transport_error(self.config.display_name, &e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::external_service(
                self.config.display_name,
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(self.parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse {} response: {e}", self.config.provider_name);
            AppError::external_service(
                self.config.display_name,
                format!("Failed to parse response: {e}"),
            )
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(self.config.display_name, "API returned no choices")
        })?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            content_len = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let request = self.add_auth_header(self.client.get(self.api_url("models")));
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(self.config.display_name, &e))?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groq() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::groq("gsk-test".to_owned(), None))
            .unwrap_or_else(|e| unreachable!("client build failed: {e}"))
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let provider = groq();
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_json_mode();
        let body = serde_json::to_value(provider.build_request(&request)).unwrap_or_default();

        assert_eq!(body["model"], GROQ_DEFAULT_MODEL);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_local_backend_ignores_json_mode() {
        let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::local(
            LOCAL_BASE_URL.to_owned(),
            None,
            Some("llama3.1:8b-instruct".to_owned()),
        ))
        .unwrap_or_else(|e| unreachable!("client build failed: {e}"));
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_json_mode();
        let body = serde_json::to_value(provider.build_request(&request)).unwrap_or_default();

        assert!(body.get("response_format").is_none());
        assert_eq!(body["model"], "llama3.1:8b-instruct");
    }

    #[test]
    fn test_error_status_mapping() {
        let provider = groq();
        let body = r#"{"error":{"message":"slow down","type":"rate_limit"}}"#;

        let limited = provider.parse_error_response(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(limited.code, ErrorCode::ExternalRateLimited);

        let auth = provider.parse_error_response(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(auth.code, ErrorCode::AuthInvalid);

        let gateway = provider.parse_error_response(reqwest::StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(gateway.code, ErrorCode::ExternalServiceUnavailable);
        assert_eq!(gateway.http_status(), 503);

        let teapot = provider.parse_error_response(reqwest::StatusCode::IM_A_TEAPOT, "<html>");
        assert_eq!(teapot.code, ErrorCode::ExternalServiceError);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::local(
            "http://127.0.0.1:1/v1".to_owned(),
            None,
            None,
        ))
        .unwrap_or_else(|e| unreachable!("client build failed: {e}"));
        let request = ChatRequest::new(vec![ChatMessage::user("hi")]);

        let err = provider
            .complete(&request)
            .await
            .err()
            .unwrap_or_else(|| unreachable!("nothing listens on port 1"));
        assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAiCompatibleConfig::openai("sk-secret".to_owned(), None);
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
