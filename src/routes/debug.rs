// ABOUTME: Debug status route exposing non-secret process and environment flags
// ABOUTME: Lets operators confirm the server is up and whether an LLM key was provided
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::resources::ServerResources;

/// Response body of `GET /api/debug`
#[derive(Debug, Serialize, Deserialize)]
pub struct DebugStatus {
    /// Always `"ok"`
    pub status: String,
    /// Human-readable note
    pub message: String,
    /// Environment flags
    pub env: DebugEnv,
}

/// Environment flags; never contains secret values
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEnv {
    /// Deployment environment name
    pub environment: String,
    /// Whether `OPENAI_API_KEY` was provided
    pub has_llm_api_key: bool,
    /// Configured upstream model
    pub model: String,
}

/// Debug routes
pub struct DebugRoutes;

impl DebugRoutes {
    /// Create the debug route
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/debug", get(Self::debug_status))
            .with_state(resources)
    }

    async fn debug_status(State(resources): State<Arc<ServerResources>>) -> Json<DebugStatus> {
        let config = &resources.config;
        Json(DebugStatus {
            status: "ok".to_owned(),
            message: "Meal analysis server is running".to_owned(),
            env: DebugEnv {
                environment: config.environment.to_string(),
                has_llm_api_key: config.llm.has_api_key(),
                model: config.llm.model.clone(),
            },
        })
    }
}
