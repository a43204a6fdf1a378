// ABOUTME: Main library entry point for the meal analysis API server
// ABOUTME: Relays meal descriptions to an LLM and normalizes replies into nutrition records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Analysis Server
//!
//! A small HTTP backend that forwards a free-text meal description to an
//! `OpenAI`-compatible chat completions API and relays back a structured
//! nutrition estimate.
//!
//! The model reply is untrusted free text. Everything returned to a caller
//! passes through the [`normalizer`] pipeline first:
//!
//! 1. code fences are stripped
//! 2. a JSON object is extracted (direct parse, then the first balanced brace span)
//! 3. enabled optional fields are defaulted
//! 4. `calories` and `protein` are checked to be numbers
//! 5. all-zero estimates go through the zero-estimate fallback
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meal_analysis_server::models::MealQuery;
//! use meal_analysis_server::normalizer::{NormalizerConfig, ResponseNormalizer};
//!
//! let normalizer = ResponseNormalizer::new(NormalizerConfig::default());
//! let query = MealQuery::new("grilled chicken salad").unwrap();
//! let record = normalizer
//!     .normalize("```json\n{\"calories\": 420, \"protein\": 38}\n```", &query)
//!     .unwrap();
//! assert!((record.calories - 420.0).abs() < f64::EPSILON);
//! ```

/// Environment configuration for the server, upstream client and normalizer
pub mod config;

/// Application constants and configuration defaults
pub mod constants;

/// Unified error handling with error codes and HTTP responses
pub mod errors;

/// LLM provider abstraction and the `OpenAI`-compatible client
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware (CORS)
pub mod middleware;

/// Meal query and nutrition record models
pub mod models;

/// Model reply normalization pipeline
pub mod normalizer;

/// Shared server resources injected into route handlers
pub mod resources;

/// HTTP route definitions
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Service layer coordinating upstream calls and normalization
pub mod services;
