// ABOUTME: Google Gemini provider using the generateContent REST endpoint
// ABOUTME: Translates chat messages into contents/systemInstruction and supports JSON output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Gemini provider
//!
//! Set `GEMINI_API_KEY` with a key from Google AI Studio. The model defaults
//! to `gemini-2.5-flash` and can be overridden with `MEALMATE_LLM_MODEL`.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{
    transport_error, ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole,
    TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

/// Gemini API key variable
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const AVAILABLE_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
];

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Google Gemini backend
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Provider with an explicit key
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            default_model: model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        })
    }

    /// Provider from `GEMINI_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns a config error if the key is missing
    pub fn from_env(model: Option<String>) -> Result<Self, AppError> {
        let api_key = env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!("{GEMINI_API_KEY_ENV} is required for the Gemini provider"))
            })?;
        Self::new(api_key, model)
    }

    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::Assistant => "model",
            MessageRole::User | MessageRole::System => "user",
        }
    }

    /// Non-system messages become `contents`; system messages are merged into one instruction
    fn convert_messages(messages: &[ChatMessage]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::with_capacity(messages.len());
        let mut system_parts = Vec::new();

        for message in messages {
            if message.role == MessageRole::System {
                system_parts.push(TextPart {
                    text: message.content.clone(),
                });
            } else {
                contents.push(GeminiContent {
                    role: Some(Self::convert_role(message.role).to_owned()),
                    parts: vec![TextPart {
                        text: message.content.clone(),
                    }],
                });
            }
        }

        let system_instruction = (!system_parts.is_empty()).then_some(GeminiContent {
            role: None,
            parts: system_parts,
        });
        (contents, system_instruction)
    }

    fn build_request(request: &ChatRequest) -> GeminiRequest {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);
        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                candidate_count: Some(1),
                response_mime_type: request.json_mode.then_some("application/json"),
            }),
        }
    }

    fn extract_content(response: &GeminiResponse) -> Result<String, AppError> {
        let content = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .ok_or_else(|| AppError::external_service("Gemini", "No content in response"))?;
        Ok(content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<String>())
    }

    fn map_api_error(status: u16, body: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.chars().take(200).collect(), |e| e.message);

        match status {
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                "AI service quota exceeded. Please wait a moment and try again.",
            ),
            401 | 403 => AppError::auth_invalid(format!("Gemini authentication failed: {message}")),
            502..=504 => AppError::service_unavailable("Gemini", format!("API error ({status}): {message}")),
            400 => AppError::invalid_input(format!("Gemini rejected the request: {message}")),
            _ => AppError::external_service("Gemini", format!("API error ({status}): {message}")),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::JSON_MODE
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    #[instrument(skip(self, request), fields(model = %self.default_model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = &self.default_model;
        let url = format!("{API_BASE_URL}/models/{model}:generateContent");
        let body = Self::build_request(request);

        debug!(contents = body.contents.len(), "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Gemini: {e}");
                transport_error("Gemini", &e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::external_service("Gemini", format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response");
            AppError::external_service("Gemini", format!("Failed to parse response: {e}"))
        })?;

        if let Some(error) = parsed.error.as_ref() {
            return Err(AppError::external_service("Gemini", error.message.clone()));
        }

        let content = Self::extract_content(&parsed)?;
        let usage = parsed.usage_metadata.as_ref().map(|m| TokenUsage {
            prompt_tokens: m.prompt_token_count.unwrap_or(0),
            completion_tokens: m.candidates_token_count.unwrap_or(0),
            total_tokens: m.total_token_count.unwrap_or(0),
        });
        let finish_reason = parsed
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.clone());

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage,
            finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(format!("{API_BASE_URL}/models"))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", &e))?;
        Ok(response.status().is_success())
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_become_instruction() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("dinner?"),
            ChatMessage::assistant("{}"),
        ])
        .with_json_mode()
        .with_temperature(0.5);

        let body = serde_json::to_value(GeminiProvider::build_request(&request)).unwrap_or_default();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["contents"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_extract_content_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap_or_else(|e| unreachable!("fixture must parse: {e}"));

        assert_eq!(GeminiProvider::extract_content(&response).ok().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_quota_maps_to_rate_limited() {
        let body = r#"{"error":{"message":"Quota exceeded. Please retry in 6.4s."}}"#;
        assert_eq!(GeminiProvider::map_api_error(429, body).code, ErrorCode::ExternalRateLimited);
        assert_eq!(GeminiProvider::map_api_error(500, body).code, ErrorCode::ExternalServiceError);
        assert_eq!(
            GeminiProvider::map_api_error(503, body).code,
            ErrorCode::ExternalServiceUnavailable
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("AIza-secret", None)
            .unwrap_or_else(|e| unreachable!("client build failed: {e}"));
        assert!(!format!("{provider:?}").contains("AIza-secret"));
    }
}
