// ABOUTME: Shared resource container injected into every route handler
// ABOUTME: Holds configuration, the optional upstream LLM provider, and the response normalizer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and shared behind an `Arc`. Nothing here is mutated
//! after construction.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};
use crate::normalizer::ResponseNormalizer;
use crate::services::{MealAnalysisService, RetryPolicy};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Upstream model client; `None` when no credentials were configured
    pub llm_provider: Option<Arc<dyn LlmProvider>>,
    /// Reply normalizer built from `config.normalizer`
    pub normalizer: ResponseNormalizer,
}

impl ServerResources {
    /// Create resources with an explicit provider
    #[must_use]
    pub fn new(config: Arc<ServerConfig>, llm_provider: Option<Arc<dyn LlmProvider>>) -> Self {
        let normalizer = ResponseNormalizer::new(config.normalizer.clone());
        Self {
            config,
            llm_provider,
            normalizer,
        }
    }

    /// Create resources, building the `OpenAI`-compatible provider when the
    /// configuration allows it
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for the provider cannot be built.
    pub fn from_config(config: Arc<ServerConfig>) -> AppResult<Self> {
        let provider: Option<Arc<dyn LlmProvider>> = if config.llm.is_configured() {
            let provider = OpenAiCompatibleProvider::from_config(&config.llm)?;
            info!(
                base_url = %config.llm.base_url,
                model = %config.llm.model,
                "Upstream LLM client initialized"
            );
            Some(Arc::new(provider))
        } else {
            warn!("OPENAI_API_KEY is not set; meal analysis requests will fail until it is configured");
            None
        };
        Ok(Self::new(config, provider))
    }

    /// Whether an upstream client is available
    #[must_use]
    pub fn has_llm_provider(&self) -> bool {
        self.llm_provider.is_some()
    }

    /// Meal analysis service bound to the configured provider
    ///
    /// # Errors
    ///
    /// Returns `SERVICE_UNAVAILABLE` when no upstream client is configured.
    pub fn meal_analysis(&self) -> AppResult<MealAnalysisService> {
        let provider = self
            .llm_provider
            .clone()
            .ok_or_else(|| AppError::service_unavailable("AI service not available"))?;

        Ok(MealAnalysisService::new(provider, self.normalizer.clone())
            .with_retry(RetryPolicy::from(&self.config.llm)))
    }
}
