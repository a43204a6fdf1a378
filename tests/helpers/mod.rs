// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the in-process HTTP client, a scripted LLM provider, and resource builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod scripted_provider;

use meal_analysis_server::{
    config::ServerConfig, llm::LlmProvider, resources::ServerResources, server::build_router,
};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Full application router backed by `provider`
#[allow(dead_code)]
pub fn app_with_provider(config: ServerConfig, provider: Option<Arc<dyn LlmProvider>>) -> axum::Router {
    init_test_logging();
    let resources = Arc::new(ServerResources::new(Arc::new(config), provider));
    build_router(resources)
}
