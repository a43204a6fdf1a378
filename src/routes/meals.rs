// ABOUTME: Meal analysis route handlers for the nutrition estimate endpoint
// ABOUTME: Validates the request body, then delegates to the meal analysis service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Meal analysis routes
//!
//! `POST /api/analyze-meal` (also served at `/analyze-meal`) takes
//! `{"meal": "...", ...context}` and returns a [`NutritionRecord`].

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    errors::AppError,
    models::{AnalyzeMealRequest, MealQuery, NutritionRecord},
    resources::ServerResources,
};

/// Meal analysis routes
pub struct MealRoutes;

impl MealRoutes {
    /// Create all meal analysis routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analyze-meal", post(Self::analyze_meal))
            .route("/analyze-meal", post(Self::analyze_meal))
            .with_state(resources)
    }

    /// Handle a meal analysis request
    ///
    /// The body is validated before the upstream client is looked up, so a
    /// bad request is a 400 even when the server has no API key.
    async fn analyze_meal(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<AnalyzeMealRequest>, JsonRejection>,
    ) -> Result<Json<NutritionRecord>, AppError> {
        let Json(request) = payload.map_err(|rejection| {
            AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
        })?;
        let query = MealQuery::try_from(request)?;
        debug!(has_context = !query.context.is_empty(), "Meal analysis requested");

        let record = resources.meal_analysis()?.analyze(&query).await?;
        Ok(Json(record))
    }
}
