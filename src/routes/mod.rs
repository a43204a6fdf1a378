// ABOUTME: Route module organization for the meal analysis HTTP endpoints
// ABOUTME: Groups meal analysis, health, and debug routers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each module exposes a `XRoutes::routes(resources)` constructor returning
//! an axum [`Router`](axum::Router) with its state already applied.

/// Debug status route
pub mod debug;
/// Liveness and readiness routes
pub mod health;
/// Meal analysis routes
pub mod meals;

pub use debug::DebugRoutes;
pub use health::HealthRoutes;
pub use meals::MealRoutes;
