// ABOUTME: Domain service layer for business logic kept out of route handlers
// ABOUTME: Hosts the meal analysis flow shared by HTTP routes and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Route handlers stay thin: they validate the wire format and delegate here.

/// Meal analysis: prompt, upstream call with optional retry, normalization
pub mod meal_analysis;

pub use meal_analysis::{MealAnalysisService, RetryPolicy};
