// ABOUTME: Environment configuration for the meal analysis server
// ABOUTME: Parses listen address, upstream LLM settings, response extensions, and CORS from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::info;

use crate::constants::{env_vars, llm, network, nutrition};
use crate::normalizer::{ExtensionField, NormalizerConfig, ZeroEstimatePolicy};

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream LLM settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Bearer token; never logged
    pub api_key: Option<String>,
    /// Chat completions base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Total request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for transient upstream failures
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: llm::DEFAULT_BASE_URL.to_owned(),
            model: llm::DEFAULT_MODEL.to_owned(),
            timeout_secs: llm::DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: llm::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: llm::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl LlmConfig {
    /// Whether a key is set
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the base URL points at this machine
    #[must_use]
    pub fn is_local_endpoint(&self) -> bool {
        let url = self.base_url.to_lowercase();
        url.contains("://localhost") || url.contains("://127.0.0.1") || url.contains("://[::1]")
    }

    /// Whether an upstream client should be built at startup
    ///
    /// Local endpoints don't need a key.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.has_api_key() || self.is_local_endpoint()
    }
}

/// CORS settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Upstream LLM
    pub llm: LlmConfig,
    /// Response normalization
    pub normalizer: NormalizerConfig,
    /// CORS
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: network::DEFAULT_HTTP_PORT,
            host: network::DEFAULT_HOST.to_owned(),
            environment: Environment::default(),
            llm: LlmConfig::default(),
            normalizer: NormalizerConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env_opt(env_vars::HTTP_PORT).or_else(|| env_opt(env_vars::PORT)) {
            Some(port) => port
                .parse()
                .with_context(|| format!("Invalid HTTP port: {port}"))?,
            None => network::DEFAULT_HTTP_PORT,
        };

        let environment = env_opt(env_vars::ENVIRONMENT)
            .or_else(|| env_opt(env_vars::NODE_ENV))
            .map(|e| Environment::from_str_or_default(&e))
            .unwrap_or_default();

        let config = Self {
            http_port,
            host: env_var_or(env_vars::HOST, network::DEFAULT_HOST),
            environment,
            llm: LlmConfig {
                api_key: env_opt(env_vars::OPENAI_API_KEY),
                base_url: env_var_or(env_vars::OPENAI_BASE_URL, llm::DEFAULT_BASE_URL),
                model: env_var_or(env_vars::OPENAI_MODEL, llm::DEFAULT_MODEL),
                timeout_secs: parse_env(
                    env_vars::LLM_TIMEOUT_SECS,
                    llm::DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
                max_retries: parse_env(env_vars::LLM_MAX_RETRIES, llm::DEFAULT_MAX_RETRIES)?,
                retry_backoff_ms: parse_env(
                    env_vars::LLM_RETRY_BACKOFF_MS,
                    llm::DEFAULT_RETRY_BACKOFF_MS,
                )?,
            },
            normalizer: NormalizerConfig {
                extensions: parse_extensions(&env_var_or(env_vars::MEAL_RESPONSE_EXTENSIONS, ""))?,
                zero_estimate: parse_zero_estimate_policy(
                    &env_var_or(env_vars::ZERO_ESTIMATE_FALLBACK, "known_patterns"),
                    parse_env(
                        env_vars::NEUTRAL_ESTIMATE_CALORIES,
                        nutrition::NEUTRAL_ESTIMATE_CALORIES,
                    )?,
                    parse_env(
                        env_vars::NEUTRAL_ESTIMATE_PROTEIN,
                        nutrition::NEUTRAL_ESTIMATE_PROTEIN,
                    )?,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or(env_vars::CORS_ALLOWED_ORIGINS, "*"),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("{} must be greater than 0", env_vars::LLM_TIMEOUT_SECS);
        }
        if self.llm.max_retries > llm::MAX_RETRIES_LIMIT {
            anyhow::bail!(
                "{} must be at most {}",
                env_vars::LLM_MAX_RETRIES,
                llm::MAX_RETRIES_LIMIT
            );
        }
        if let ZeroEstimatePolicy::Neutral { calories, protein } = self.normalizer.zero_estimate {
            if !(calories.is_finite() && protein.is_finite()) || calories < 0.0 || protein < 0.0 {
                anyhow::bail!("Neutral estimate values must be finite and non-negative");
            }
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let extensions = if self.normalizer.extensions.is_empty() {
            "none".to_owned()
        } else {
            self.normalizer
                .extensions
                .iter()
                .map(ExtensionField::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };

        format!(
            "Meal Analysis Server Configuration:\n\
             - Listen: {}:{}\n\
             - Environment: {}\n\
             - LLM Endpoint: {}\n\
             - LLM Model: {}\n\
             - LLM API Key: {}\n\
             - LLM Retries: {}\n\
             - Response Extensions: {}\n\
             - Zero-Estimate Fallback: {}\n\
             - CORS Origins: {}",
            self.host,
            self.http_port,
            self.environment,
            self.llm.base_url,
            self.llm.model,
            if self.llm.has_api_key() {
                "Configured"
            } else {
                "Missing"
            },
            self.llm.max_retries,
            extensions,
            self.normalizer.zero_estimate.as_str(),
            self.cors.allowed_origins,
        )
    }
}

/// Non-empty value of an environment variable
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_owned())
}

/// Parse an environment variable, using `default` when it is unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_opt(key).map_or(Ok(default), |raw| {
        raw.parse()
            .with_context(|| format!("Invalid {key} value: {raw}"))
    })
}

/// Parse a comma-separated extension list, ignoring duplicates
///
/// # Errors
///
/// Returns an error on an unknown extension name.
pub fn parse_extensions(list: &str) -> Result<Vec<ExtensionField>> {
    let mut extensions = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let field = name.parse::<ExtensionField>().map_err(anyhow::Error::msg)?;
        if !extensions.contains(&field) {
            extensions.push(field);
        }
    }
    Ok(extensions)
}

/// Parse a zero-estimate policy name
///
/// # Errors
///
/// Returns an error on an unknown policy name.
pub fn parse_zero_estimate_policy(
    name: &str,
    neutral_calories: f64,
    neutral_protein: f64,
) -> Result<ZeroEstimatePolicy> {
    match name.trim().to_lowercase().as_str() {
        "disabled" | "off" | "none" => Ok(ZeroEstimatePolicy::Disabled),
        "known_patterns" | "known" => Ok(ZeroEstimatePolicy::KnownPatterns),
        "neutral" => Ok(ZeroEstimatePolicy::Neutral {
            calories: neutral_calories,
            protein: neutral_protein,
        }),
        other => anyhow::bail!(
            "Invalid {} value '{other}' (expected disabled, known_patterns, or neutral)",
            env_vars::ZERO_ESTIMATE_FALLBACK
        ),
    }
}
