// ABOUTME: System-wide constants and configuration defaults for the meal analysis server
// ABOUTME: Contains environment variable names, network defaults, and upstream client limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded defaults and the names of the environment variables that
//! override them. Parsing lives in [`crate::config::environment`].

/// Service identity used in logs and status endpoints
pub mod service_names {
    /// Service name for structured logging
    pub const MEAL_ANALYSIS_SERVER: &str = "meal-analysis-server";
}

/// Environment variable names
pub mod env_vars {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Listen port fallback used by most hosting platforms
    pub const PORT: &str = "PORT";
    /// Bind address
    pub const HOST: &str = "HOST";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Deployment environment fallback
    pub const NODE_ENV: &str = "NODE_ENV";
    /// Log level / filter directive
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Log output format
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Upstream API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Upstream base URL
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Upstream model
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    /// Upstream request timeout in seconds
    pub const LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
    /// Upstream retry attempts after the first failure
    pub const LLM_MAX_RETRIES: &str = "LLM_MAX_RETRIES";
    /// Initial retry backoff in milliseconds
    pub const LLM_RETRY_BACKOFF_MS: &str = "LLM_RETRY_BACKOFF_MS";
    /// Comma-separated list of enabled response extensions
    pub const MEAL_RESPONSE_EXTENSIONS: &str = "MEAL_RESPONSE_EXTENSIONS";
    /// Zero-estimate fallback policy
    pub const ZERO_ESTIMATE_FALLBACK: &str = "ZERO_ESTIMATE_FALLBACK";
    /// Neutral default calories for the `neutral` fallback policy
    pub const NEUTRAL_ESTIMATE_CALORIES: &str = "NEUTRAL_ESTIMATE_CALORIES";
    /// Neutral default protein for the `neutral` fallback policy
    pub const NEUTRAL_ESTIMATE_PROTEIN: &str = "NEUTRAL_ESTIMATE_PROTEIN";
    /// Allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
}

/// Network defaults
pub mod network {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 3000;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    /// Maximum accepted request body size (meal text plus context)
    pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;
}

/// Upstream LLM client defaults
pub mod llm {
    /// Default `OpenAI` API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default chat model
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
    /// Connection timeout
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Default total request timeout
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    /// Default retry attempts (single-attempt contract)
    pub const DEFAULT_MAX_RETRIES: u32 = 0;
    /// Hard cap on configured retries
    pub const MAX_RETRIES_LIMIT: u32 = 5;
    /// Default initial backoff between retries
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
    /// Characters of a failed upstream body kept in error messages
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;
}

/// Nutrition estimate defaults
pub mod nutrition {
    /// Neutral default calories for the `neutral` zero-estimate policy
    pub const NEUTRAL_ESTIMATE_CALORIES: f64 = 400.0;
    /// Neutral default protein (grams) for the `neutral` zero-estimate policy
    pub const NEUTRAL_ESTIMATE_PROTEIN: f64 = 20.0;
}
