// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness always answers; readiness also probes the upstream model endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health))
            .route("/ready", get(Self::ready))
            .with_state(resources)
    }

    async fn health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Ready once an upstream client exists and its endpoint answers
    async fn ready(State(resources): State<Arc<ServerResources>>) -> (StatusCode, Json<Value>) {
        let (status, label) = match &resources.llm_provider {
            None => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            Some(provider) => match provider.health_check().await {
                Ok(true) => (StatusCode::OK, "ready"),
                Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "upstream_unhealthy"),
                Err(e) => {
                    warn!(provider = provider.name(), "Upstream health check failed: {}", e.message);
                    (StatusCode::SERVICE_UNAVAILABLE, "upstream_unhealthy")
                }
            },
        };

        (
            status,
            Json(json!({
                "status": label,
                "llm_configured": resources.has_llm_provider(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
    }
}
