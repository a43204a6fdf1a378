// ABOUTME: Meal analysis service running one query through the upstream model and the normalizer
// ABOUTME: Retries transient upstream failures with exponential backoff when configured to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::config::LlmConfig;
use crate::constants::llm;
use crate::errors::AppResult;
use crate::llm::{build_chat_request, LlmProvider};
use crate::models::{MealQuery, NutritionRecord};
use crate::normalizer::ResponseNormalizer;

/// Retry settings for upstream calls
///
/// Only transport and rate-limit failures are retried. A reply that fails
/// normalization is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    /// Backoff before the first retry, doubled for each further retry
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: llm::DEFAULT_MAX_RETRIES,
            initial_backoff_ms: llm::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based)
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u64.saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

impl From<&LlmConfig> for RetryPolicy {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff_ms: config.retry_backoff_ms,
        }
    }
}

/// Runs meal queries against the upstream model
#[derive(Clone)]
pub struct MealAnalysisService {
    provider: Arc<dyn LlmProvider>,
    normalizer: ResponseNormalizer,
    retry: RetryPolicy,
}

impl MealAnalysisService {
    /// Create a service with the given provider and normalizer
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, normalizer: ResponseNormalizer) -> Self {
        Self {
            provider,
            normalizer,
            retry: RetryPolicy::none(),
        }
    }

    /// Set the retry policy
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyze one meal
    ///
    /// # Errors
    ///
    /// - upstream errors once retries are exhausted (or immediately when
    ///   the error is not transient)
    /// - `RESPONSE_PARSE_FAILED` / `RESPONSE_SHAPE_INVALID` when the reply
    ///   cannot be normalized
    #[instrument(skip(self, query), fields(provider = self.provider.name(), meal_len = query.meal.len()))]
    pub async fn analyze(&self, query: &MealQuery) -> AppResult<NutritionRecord> {
        let request = build_chat_request(query, self.normalizer.config());

        let mut retry = 0;
        let response = loop {
            match self.provider.complete(&request).await {
                Ok(response) => break response,
                Err(error) if error.is_retryable() && retry < self.retry.max_retries => {
                    retry += 1;
                    let backoff = self.retry.backoff(retry);
                    warn!(
                        code = ?error.code,
                        retry,
                        max_retries = self.retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Upstream call failed, retrying: {}",
                        error.message
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return Err(error),
            }
        };

        let reply = response.content.trim();
        let record = self.normalizer.normalize(reply, query)?;

        info!(
            model = %response.model,
            calories = record.calories,
            protein = record.protein,
            "Meal analyzed"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff_ms: 100,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_default_policy_does_not_retry() {
        assert_eq!(RetryPolicy::default().max_retries, 0);
    }
}
