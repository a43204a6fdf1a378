// ABOUTME: HTTP integration tests for health, readiness, and debug status endpoints
// ABOUTME: Checks readiness reflects upstream configuration and that debug output never leaks the key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use helpers::axum_test::AxumTestRequest;
use helpers::scripted_provider::ScriptedProvider;
use meal_analysis_server::{config::ServerConfig, llm::LlmProvider};
use serde_json::Value;
use std::sync::Arc;

fn configured_app(config: ServerConfig) -> axum::Router {
    let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::default());
    helpers::app_with_provider(config, Some(provider))
}

#[tokio::test]
async fn test_health_is_always_ok() {
    let app = helpers::app_with_provider(ServerConfig::default(), None);

    let response = AxumTestRequest::get("/health").send(app).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_ready_with_provider() {
    let response = AxumTestRequest::get("/ready")
        .send(configured_app(ServerConfig::default()))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["llm_configured"], true);
}

#[tokio::test]
async fn test_not_ready_without_provider() {
    let app = helpers::app_with_provider(ServerConfig::default(), None);

    let response = AxumTestRequest::get("/ready").send(app).await;

    assert_eq!(response.status(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_not_ready_when_upstream_health_check_fails() {
    let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::unhealthy());
    let app = helpers::app_with_provider(ServerConfig::default(), Some(provider));

    let response = AxumTestRequest::get("/ready").send(app).await;

    assert_eq!(response.status(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "upstream_unhealthy");
    assert_eq!(body["llm_configured"], true);
}

#[tokio::test]
async fn test_debug_reports_flags_without_secret() {
    let mut config = ServerConfig::default();
    config.llm.api_key = Some("sk-very-secret".to_owned());
    config.llm.model = "gpt-4o-mini".to_owned();

    let response = AxumTestRequest::get("/api/debug")
        .send(configured_app(config))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["env"]["hasLlmApiKey"], true);
    assert_eq!(body["env"]["model"], "gpt-4o-mini");
    assert_eq!(body["env"]["environment"], "development");
    assert!(!body.to_string().contains("sk-very-secret"));
}

#[tokio::test]
async fn test_debug_without_key() {
    let app = helpers::app_with_provider(ServerConfig::default(), None);

    let response = AxumTestRequest::get("/api/debug").send(app).await;

    let body: Value = response.json();
    assert_eq!(body["env"]["hasLlmApiKey"], false);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = helpers::app_with_provider(ServerConfig::default(), None);

    let response = AxumTestRequest::get("/api/nope").send(app).await;

    assert_eq!(response.status(), 404);
}
