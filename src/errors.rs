// ABOUTME: Unified error handling with standard error codes and HTTP response formatting
// ABOUTME: Maps validation, upstream, and normalization failures onto status codes and payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the server surfaces an [`AppError`]. The error
//! carries a stable [`ErrorCode`], a human-readable message and, for
//! normalization failures, the raw model reply and parsed value so callers
//! can diagnose what the model actually said.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::normalizer::NormalizationError;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,

    // Upstream model service (5000-5999)
    #[serde(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable = 5000,
    #[serde(rename = "UPSTREAM_ERROR")]
    UpstreamError = 5001,
    #[serde(rename = "UPSTREAM_AUTH_FAILED")]
    UpstreamAuthFailed = 5002,
    #[serde(rename = "UPSTREAM_RATE_LIMITED")]
    UpstreamRateLimited = 5003,

    // Reply normalization (7000-7999)
    #[serde(rename = "RESPONSE_PARSE_FAILED")]
    ResponseParseFailed = 7000,
    #[serde(rename = "RESPONSE_SHAPE_INVALID")]
    ResponseShapeInvalid = 7001,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6000,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    ///
    /// Clients only distinguish "bad request" from "server-side failure";
    /// every upstream and normalization failure is a 500.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField => 400,

            Self::ServiceUnavailable
            | Self::UpstreamError
            | Self::UpstreamAuthFailed
            | Self::UpstreamRateLimited
            | Self::ResponseParseFailed
            | Self::ResponseShapeInvalid
            | Self::ConfigInvalid
            | Self::InternalError => 500,
        }
    }

    /// Headline used as the `error` field of response payloads
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid request body",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ServiceUnavailable => "AI service not available",
            Self::UpstreamError | Self::UpstreamAuthFailed | Self::UpstreamRateLimited => {
                "Failed to analyze meal"
            }
            Self::ResponseParseFailed => "Invalid response format from AI service",
            Self::ResponseShapeInvalid => "Invalid nutrition data format",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Raw upstream model reply, attached to normalization failures
    pub raw_response: Option<String>,
    /// Parsed (but rejected) model output, attached to shape failures
    pub data: Option<Value>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            raw_response: None,
            data: None,
        }
    }

    /// Attach the raw model reply
    #[must_use]
    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    /// Attach the parsed model output
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether a fresh upstream attempt could succeed where this one failed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UpstreamError | ErrorCode::UpstreamRateLimited
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required request field missing or empty
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingRequiredField, message)
    }

    /// Upstream client was never configured
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Upstream network or API failure
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UpstreamError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Upstream rejected our credentials
    pub fn upstream_auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamAuthFailed, message)
    }

    /// Upstream rate limit hit
    pub fn upstream_rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamRateLimited, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// HTTP error response format
///
/// Flat on purpose: `{error, code, message?, rawResponse?, data?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Headline for the failure class
    pub error: String,
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Detail message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw model reply for normalization failures
    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    /// Parsed model output for shape failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: error.code.description().to_owned(),
            code: error.code,
            message: Some(error.message),
            raw_response: error.raw_response,
            data: error.data,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = ?self.code, status = %status, "Request failed: {}", self.message);
        } else {
            warn!(code = ?self.code, status = %status, "Request rejected: {}", self.message);
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

impl From<NormalizationError> for AppError {
    fn from(error: NormalizationError) -> Self {
        let message = error.to_string();
        match error {
            NormalizationError::Parse { raw } => {
                Self::new(ErrorCode::ResponseParseFailed, message).with_raw_response(raw)
            }
            NormalizationError::Shape { parsed, raw, .. } => {
                Self::new(ErrorCode::ResponseShapeInvalid, message)
                    .with_data(parsed)
                    .with_raw_response(raw)
            }
        }
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{error:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::MissingRequiredField.http_status(), 400);
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::ServiceUnavailable.http_status(), 500);
        assert_eq!(ErrorCode::UpstreamRateLimited.http_status(), 500);
        assert_eq!(ErrorCode::ResponseShapeInvalid.http_status(), 500);
        assert_eq!(AppError::config("bad port").http_status(), 500);
    }

    #[test]
    fn test_parse_error_payload_carries_raw_reply() {
        let error = AppError::from(NormalizationError::Parse {
            raw: "not json at all".to_owned(),
        });
        let json = serde_json::to_value(ErrorResponse::from(error)).unwrap();

        assert_eq!(json["error"], "Invalid response format from AI service");
        assert_eq!(json["code"], "RESPONSE_PARSE_FAILED");
        assert_eq!(json["rawResponse"], "not json at all");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_shape_error_payload_carries_parsed_value() {
        let error = AppError::from(NormalizationError::Shape {
            reason: "field `calories` must be a number".to_owned(),
            parsed: json!({"calories": "lots", "protein": 3}),
            raw: r#"{"calories": "lots", "protein": 3}"#.to_owned(),
        });
        let json = serde_json::to_value(ErrorResponse::from(error)).unwrap();

        assert_eq!(json["code"], "RESPONSE_SHAPE_INVALID");
        assert_eq!(json["data"]["calories"], "lots");
        assert!(json["rawResponse"].as_str().unwrap().contains("lots"));
    }

    #[test]
    fn test_only_transient_upstream_errors_are_retryable() {
        assert!(AppError::upstream("OpenAI", "connection reset").is_retryable());
        assert!(AppError::upstream_rate_limited("slow down").is_retryable());
        assert!(!AppError::upstream_auth("bad key").is_retryable());
        assert!(!AppError::missing_field("meal").is_retryable());
    }
}
