// ABOUTME: Runtime LLM backend selector driven by environment variables
// ABOUTME: Wraps the OpenAI-compatible and Gemini clients behind one LlmProvider value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Provider selection
//!
//! `MEALMATE_LLM_PROVIDER` picks the backend:
//! - `groq` (default), needs `GROQ_API_KEY`
//! - `gemini`, needs `GEMINI_API_KEY`
//! - `openai`, needs `OPENAI_API_KEY`
//! - `local`, uses `LOCAL_LLM_BASE_URL`
//! - `none` disables AI; flows then serve their fallbacks
//!
//! If the primary cannot be built and `MEALMATE_LLM_FALLBACK_PROVIDER` names
//! a different backend, that one is tried instead.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ChatRequest, ChatResponse, GeminiProvider, LlmCapabilities, LlmProvider,
    OpenAiCompatibleProvider,
};
use crate::config::LlmProviderType;
use crate::errors::AppError;

/// A configured text-completion backend
pub enum ChatProvider {
    /// Groq, `OpenAI` or a local server
    OpenAiCompatible(OpenAiCompatibleProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
}

impl ChatProvider {
    /// Build the provider selected by the environment
    ///
    /// Returns `Ok(None)` when AI is disabled with `MEALMATE_LLM_PROVIDER=none`.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary provider cannot be built and no usable
    /// fallback is configured
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let Some(provider_type) = LlmProviderType::from_env() else {
            info!("LLM disabled via {}", LlmProviderType::ENV_VAR);
            return Ok(None);
        };

        info!(
            "Initializing LLM provider: {provider_type} (set {} to change)",
            LlmProviderType::ENV_VAR
        );

        let model = LlmProviderType::model_from_env();
        match Self::create(provider_type, model) {
            Ok(provider) => {
                debug!(
                    "Provider {} initialized with model: {}",
                    provider.display_name(),
                    provider.default_model()
                );
                Ok(Some(provider))
            }
            Err(primary_error) => Self::try_fallback(provider_type, primary_error).map(Some),
        }
    }

    fn try_fallback(primary: LlmProviderType, primary_error: AppError) -> Result<Self, AppError> {
        let Some(fallback) = LlmProviderType::fallback_provider_from_env() else {
            return Err(primary_error);
        };
        if fallback == primary {
            return Err(primary_error);
        }

        info!("Primary provider {primary} failed ({primary_error}), trying {fallback}");
        // The model override targets the primary backend only
        Self::create(fallback, None).map_err(|fallback_error| {
            AppError::config(format!(
                "Both primary ({primary}) and fallback ({fallback}) providers failed. \
                 Primary: {primary_error}. Fallback: {fallback_error}"
            ))
        })
    }

    /// Build a provider of `provider_type` from its environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the backend's key is missing
    pub fn create(provider_type: LlmProviderType, model: Option<String>) -> Result<Self, AppError> {
        Ok(match provider_type {
            LlmProviderType::Groq => {
                Self::OpenAiCompatible(OpenAiCompatibleProvider::groq_from_env(model)?)
            }
            LlmProviderType::OpenAi => {
                Self::OpenAiCompatible(OpenAiCompatibleProvider::openai_from_env(model)?)
            }
            LlmProviderType::Local => {
                Self::OpenAiCompatible(OpenAiCompatibleProvider::local_from_env(model)?)
            }
            LlmProviderType::Gemini => Self::Gemini(GeminiProvider::from_env(model)?),
        })
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::OpenAiCompatible(provider) => provider,
            Self::Gemini(provider) => provider,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    fn available_models(&self) -> &'static [&'static str] {
        self.inner().available_models()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.inner().complete(request).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}
