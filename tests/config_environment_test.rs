// ABOUTME: Unit tests for environment-driven server and flow configuration
// ABOUTME: Covers defaults, clamping, rejected values and provider selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use mealmate::config::{env_keys, Environment, FlowConfig, LlmProviderType, ServerConfig};
use serial_test::serial;

const MANAGED_VARS: &[&str] = &[
    env_keys::HTTP_PORT,
    env_keys::DATABASE_URL,
    env_keys::JWT_SECRET,
    env_keys::JWT_EXPIRY_HOURS,
    env_keys::ADMIN_EMAIL,
    env_keys::DEFAULT_CALORIE_TARGET,
    env_keys::FLOW_MAX_ATTEMPTS,
    env_keys::FLOW_TEMPERATURE,
    env_keys::FLOW_MAX_CANDIDATES,
    Environment::ENV_VAR,
    LlmProviderType::ENV_VAR,
    LlmProviderType::FALLBACK_PROVIDER_ENV_VAR,
    LlmProviderType::MODEL_ENV_VAR,
];

fn clear_env() {
    for key in MANAGED_VARS {
        env::remove_var(key);
    }
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("production"),
        Environment::Production
    );
    assert_eq!(Environment::from_str_or_default(" Test "), Environment::Testing);
    assert_eq!(
        Environment::from_str_or_default("staging"),
        Environment::Development
    );
}

#[test]
fn test_provider_parsing() {
    assert_eq!(LlmProviderType::parse("Gemini"), Some(LlmProviderType::Gemini));
    assert_eq!(LlmProviderType::parse("ollama"), Some(LlmProviderType::Local));
    assert_eq!(LlmProviderType::parse("openai"), Some(LlmProviderType::OpenAi));
    assert_eq!(LlmProviderType::parse("something"), Some(LlmProviderType::Groq));
    assert_eq!(LlmProviderType::parse("none"), None);
    assert_eq!(LlmProviderType::parse("OFF"), None);
}

#[test]
#[serial]
fn test_server_config_defaults() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.http_port, 8081);
    assert!(config.database_url.starts_with("sqlite:"));
    assert!(config.auth.jwt_secret_generated);
    assert!(!config.auth.jwt_secret.is_empty());
    assert_eq!(config.auth.jwt_expiry_hours, 24);
    assert!(config.auth.admin_email.is_none());
    assert_eq!(config.default_calorie_target, 2000);
    assert_eq!(config.flow, FlowConfig::default());
    assert_eq!(config.llm_provider, Some(LlmProviderType::Groq));
}

#[test]
#[serial]
fn test_server_config_reads_overrides() {
    clear_env();
    env::set_var(env_keys::HTTP_PORT, "9090");
    env::set_var(env_keys::DATABASE_URL, "sqlite::memory:");
    env::set_var(env_keys::JWT_SECRET, "an-explicit-secret-for-tests");
    env::set_var(env_keys::ADMIN_EMAIL, "  Chef@Example.COM ");
    env::set_var(env_keys::DEFAULT_CALORIE_TARGET, "1800");
    env::set_var(LlmProviderType::ENV_VAR, "disabled");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.database_url, "sqlite::memory:");
    assert!(!config.auth.jwt_secret_generated);
    assert_eq!(config.auth.jwt_secret, b"an-explicit-secret-for-tests".to_vec());
    assert_eq!(config.auth.admin_email.as_deref(), Some("chef@example.com"));
    assert_eq!(config.default_calorie_target, 1800);
    assert!(config.llm_provider.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_production_requires_jwt_secret() {
    clear_env();
    env::set_var(Environment::ENV_VAR, "production");

    assert!(ServerConfig::from_env().is_err());

    env::set_var(env_keys::JWT_SECRET, "production-secret-value");
    let config = ServerConfig::from_env().unwrap();
    assert!(config.environment.is_production());

    clear_env();
}

#[test]
#[serial]
fn test_server_config_rejects_bad_values() {
    clear_env();

    env::set_var(env_keys::HTTP_PORT, "not-a-port");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var(env_keys::HTTP_PORT);

    env::set_var(env_keys::JWT_EXPIRY_HOURS, "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var(env_keys::JWT_EXPIRY_HOURS);

    env::set_var(env_keys::DEFAULT_CALORIE_TARGET, "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_flow_attempts_are_clamped() {
    clear_env();

    env::set_var(env_keys::FLOW_MAX_ATTEMPTS, "0");
    assert_eq!(FlowConfig::from_env().unwrap().max_attempts, 1);

    env::set_var(env_keys::FLOW_MAX_ATTEMPTS, "12");
    assert_eq!(FlowConfig::from_env().unwrap().max_attempts, 5);

    env::set_var(env_keys::FLOW_MAX_ATTEMPTS, "3");
    assert_eq!(FlowConfig::from_env().unwrap().max_attempts, 3);

    env::set_var(env_keys::FLOW_MAX_CANDIDATES, "0");
    assert_eq!(FlowConfig::from_env().unwrap().max_candidates, 1);

    clear_env();
}

#[test]
#[serial]
fn test_flow_temperature_is_validated() {
    clear_env();

    env::set_var(env_keys::FLOW_TEMPERATURE, "2.5");
    assert!(FlowConfig::from_env().is_err());

    env::set_var(env_keys::FLOW_TEMPERATURE, "warm");
    assert!(FlowConfig::from_env().is_err());

    env::set_var(env_keys::FLOW_TEMPERATURE, "0.2");
    let flow = FlowConfig::from_env().unwrap();
    assert!((flow.temperature - 0.2).abs() < f32::EPSILON);

    clear_env();
}

#[test]
#[serial]
fn test_summary_redacts_secrets() {
    clear_env();
    env::set_var(env_keys::JWT_SECRET, "super-secret-value");
    env::set_var(env_keys::DATABASE_URL, "sqlite:./data/app.db?password=hunter2");

    let config = ServerConfig::from_env().unwrap();
    let summary = config.summary();

    assert!(!summary.contains("super-secret-value"));
    assert!(!summary.contains("hunter2"));
    assert!(summary.contains("Configured"));
    assert!(!format!("{:?}", config.auth).contains("super-secret-value"));

    clear_env();
}
