// ABOUTME: AI suggestion flows with JSON validation, corrective retries and heuristic fallback
// ABOUTME: Shared FlowRunner plus the recommendation, meal, day, plan and fridge-recipe flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

//! # Flows
//!
//! A flow ranks the catalogue for one user, asks the model to choose from the
//! best candidates and checks the answer against the catalogue. Each failed
//! attempt (provider error, unparseable output, rejected content) is logged and
//! retried with the violations appended to the conversation. When attempts run
//! out, or no provider is configured, the flow answers from the heuristic
//! ranking instead, and the result says so in its `source` field.

mod context;
mod day_plan;
mod fridge_recipe;
mod meal_plan;
mod recommended;
mod single_meal;

pub use context::{resolve_daily_target, UserContext};
pub use day_plan::DayPlanSuggestion;
pub use fridge_recipe::{Recipe, RecipeIngredient};
pub use meal_plan::MealPlanSuggestion;
pub use recommended::{DishRecommendation, RecommendedDishes};
pub use single_meal::SingleMealSuggestion;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::errors::{AppError, ErrorCode};
use crate::llm::{extract_json, ChatMessage, ChatRequest, LlmProvider};

/// Upper bound on completion length for every flow
const MAX_RESPONSE_TOKENS: u32 = 2048;

/// Where a flow result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSource {
    /// Validated model output
    Ai,
    /// Heuristic fallback
    Fallback,
}

/// A flow answer with its provenance
#[derive(Debug, Clone, Serialize)]
pub struct FlowResult<T> {
    /// AI or fallback
    pub source: FlowSource,
    /// Model calls made (0 when no provider is configured)
    pub attempts: u32,
    /// Flow-specific payload
    #[serde(flatten)]
    pub data: T,
}

impl<T> FlowResult<T> {
    const fn ai(attempts: u32, data: T) -> Self {
        Self {
            source: FlowSource::Ai,
            attempts,
            data,
        }
    }

    const fn fallback(attempts: u32, data: T) -> Self {
        Self {
            source: FlowSource::Fallback,
            attempts,
            data,
        }
    }
}

/// Why a single attempt was rejected
#[derive(Debug, Error)]
pub enum FlowError {
    /// The provider call itself failed
    #[error("provider error: {0}")]
    Provider(#[from] AppError),
    /// The output was not the expected JSON
    #[error("unparseable response: {0}")]
    Parse(String),
    /// The output parsed but broke catalogue rules
    #[error("invalid response: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl FlowError {
    fn correction_prompt(&self) -> Option<String> {
        match self {
            Self::Provider(_) => None,
            Self::Parse(reason) => Some(format!(
                "Your previous answer could not be read ({reason}). \
                 Reply again with only the JSON object in the requested shape."
            )),
            Self::Validation(violations) => Some(format!(
                "Your previous answer was rejected:\n- {}\n\
                 Fix these problems and reply again with only the JSON object.",
                violations.join("\n- ")
            )),
        }
    }
}

impl From<FlowError> for AppError {
    fn from(error: FlowError) -> Self {
        match error {
            FlowError::Provider(inner) => inner,
            FlowError::Parse(reason) => Self::new(ErrorCode::SerializationError, reason),
            FlowError::Validation(violations) => {
                Self::invalid_input("Model output failed validation")
                    .with_details(serde_json::json!({ "violations": violations }))
            }
        }
    }
}

/// Deserialize a model answer into the flow's response shape
pub(crate) fn parse_response<T: DeserializeOwned>(value: Value) -> Result<T, FlowError> {
    serde_json::from_value(value).map_err(|e| FlowError::Parse(e.to_string()))
}

/// Executes flows against an optional model
#[derive(Clone)]
pub struct FlowRunner {
    provider: Option<Arc<dyn LlmProvider>>,
    config: FlowConfig,
}

impl FlowRunner {
    /// Runner backed by `provider`, or heuristic-only when `None`
    #[must_use]
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, config: FlowConfig) -> Self {
        Self { provider, config }
    }

    /// Whether a model is configured
    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Name of the configured provider
    #[must_use]
    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Flow tuning
    #[must_use]
    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Ask the model until `validate` accepts an answer or attempts run out
    ///
    /// Returns the accepted value (if any) and the number of model calls made.
    async fn run<T, F>(
        &self,
        flow: &'static str,
        mut messages: Vec<ChatMessage>,
        mut validate: F,
    ) -> (Option<T>, u32)
    where
        F: FnMut(Value) -> Result<T, FlowError>,
    {
        let Some(provider) = self.provider.as_deref() else {
            debug!(flow, "No LLM provider configured, using fallback");
            return (None, 0);
        };

        let mut attempts = 0;
        while attempts < self.config.max_attempts {
            attempts += 1;
            let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
            debug!(flow, attempt = attempts, prompt_chars, "Sending flow prompt");

            let request = ChatRequest::new(messages.clone())
                .with_temperature(self.config.temperature)
                .with_max_tokens(MAX_RESPONSE_TOKENS)
                .with_json_mode();

            let response = match provider.complete(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(flow, attempt = attempts, error = %e, "Flow attempt failed");
                    continue;
                }
            };

            let outcome = extract_json(&response.content)
                .ok_or_else(|| FlowError::Parse("no JSON value found".to_owned()))
                .and_then(&mut validate);

            match outcome {
                Ok(value) => {
                    info!(flow, source = "ai", attempts, "Flow completed");
                    return (Some(value), attempts);
                }
                Err(e) => {
                    warn!(flow, attempt = attempts, error = %e, "Flow attempt failed");
                    if let Some(correction) = e.correction_prompt() {
                        messages.push(ChatMessage::assistant(response.content));
                        messages.push(ChatMessage::user(correction));
                    }
                }
            }
        }

        info!(flow, source = "fallback", attempts, "Flow exhausted attempts, using fallback");
        (None, attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_result_flattens_payload() {
        #[derive(Serialize)]
        struct Payload {
            items: Vec<u32>,
        }

        let result = FlowResult::fallback(2, Payload { items: vec![1, 2] });
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["attempts"], 2);
        assert_eq!(json["items"][1], 2);
    }

    #[test]
    fn test_validation_error_converts_with_details() {
        let error: AppError = FlowError::Validation(vec!["unknown dish".to_owned()]).into();
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.context.details["violations"][0], "unknown dish");
    }

    #[test]
    fn test_provider_errors_are_not_reprompted() {
        assert!(FlowError::Provider(AppError::internal("down"))
            .correction_prompt()
            .is_none());
        let prompt = FlowError::Validation(vec!["a".to_owned(), "b".to_owned()])
            .correction_prompt()
            .unwrap_or_default();
        assert!(prompt.contains("- a\n- b"));
    }
}
