// ABOUTME: Scripted LLM provider that replays canned replies for tests
// ABOUTME: Records every request so tests can assert on prompts, call counts, and health
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use meal_analysis_server::{
    errors::{AppError, ErrorCode},
    llm::{ChatRequest, ChatResponse, LlmProvider},
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted upstream outcome
#[derive(Debug, Clone)]
pub enum Script {
    /// Successful completion with this content
    Reply(String),
    /// Failure with this code and message
    Fail(ErrorCode, String),
}

/// Provider that pops one [`Script`] per call
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
    unhealthy: bool,
}

impl ScriptedProvider {
    /// Provider returning `reply` once
    pub fn replying(reply: &str) -> Self {
        Self::with_scripts(vec![Script::Reply(reply.to_owned())])
    }

    /// Provider replaying `scripts` in order
    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
            unhealthy: false,
        }
    }

    /// Provider whose health check reports the endpoint as down
    #[allow(dead_code)]
    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.scripts.lock().unwrap().pop_front();
        match script {
            Some(Script::Reply(content)) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Some(Script::Fail(code, message)) => Err(AppError::new(code, message)),
            None => Err(AppError::upstream("Scripted", "no scripted reply left")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(!self.unhealthy)
    }
}
