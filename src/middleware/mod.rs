// ABOUTME: HTTP middleware shared by every route of the meal analysis server
// ABOUTME: Provides the CORS layer built from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Cross-origin resource sharing
pub mod cors;

pub use cors::setup_cors;
