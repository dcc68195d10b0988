// ABOUTME: Small configuration enums shared by the server config and the LLM selector
// ABOUTME: Environment (development/production/testing) and LlmProviderType
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production: secrets are mandatory
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Variable holding the environment name
    pub const ENV_VAR: &'static str = "ENVIRONMENT";

    /// Parse, falling back to development for unknown names
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Read [`Self::ENV_VAR`]
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }

    /// Whether this is production
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether this is a test run
    #[must_use]
    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Text-completion backend used by the suggestion flows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Groq chat completions (default)
    #[default]
    Groq,
    /// Google Gemini `generateContent`
    Gemini,
    /// `OpenAI` chat completions
    OpenAi,
    /// Ollama, vLLM or another local `OpenAI`-compatible server
    Local,
}

impl LlmProviderType {
    /// Primary provider selection
    pub const ENV_VAR: &'static str = "MEALMATE_LLM_PROVIDER";
    /// Model override applied to the primary provider
    pub const MODEL_ENV_VAR: &'static str = "MEALMATE_LLM_MODEL";
    /// Provider tried when the primary cannot be initialized
    pub const FALLBACK_PROVIDER_ENV_VAR: &'static str = "MEALMATE_LLM_FALLBACK_PROVIDER";

    /// Parse a provider name; `none`, `off` and `disabled` yield `None`
    ///
    /// Unknown names fall back to the default provider.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "disabled" => None,
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            "local" | "ollama" | "vllm" => Some(Self::Local),
            _ => Some(Self::Groq),
        }
    }

    /// Primary provider; Groq when unset, `None` when explicitly disabled
    #[must_use]
    pub fn from_env() -> Option<Self> {
        match env::var(Self::ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Some(Self::default()),
        }
    }

    /// Fallback provider, only when configured
    #[must_use]
    pub fn fallback_provider_from_env() -> Option<Self> {
        env::var(Self::FALLBACK_PROVIDER_ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| Self::parse(&s))
    }

    /// Model override, only when configured
    #[must_use]
    pub fn model_from_env() -> Option<String> {
        env::var(Self::MODEL_ENV_VAR)
            .ok()
            .filter(|m| !m.trim().is_empty())
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Local => "local",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProviderType::parse("Ollama"), Some(LlmProviderType::Local));
        assert_eq!(LlmProviderType::parse("openai"), Some(LlmProviderType::OpenAi));
        assert_eq!(LlmProviderType::parse("off"), None);
        assert_eq!(LlmProviderType::parse("whatever"), Some(LlmProviderType::Groq));
    }
}
