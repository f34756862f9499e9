//! API error types and the client error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vsum_models::{sanitize_message, ErrorCode};
use vsum_store::{RateDecision, StoreError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Job not found")]
    JobNotFound,

    #[error("Job is cancelled")]
    JobCancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Rate limit exceeded")]
    RateLimited(RateDecision),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::JobNotFound => StatusCode::NOT_FOUND,
            ApiError::JobCancelled => StatusCode::GONE,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) | ApiError::Internal(_) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ApiError::JobNotFound => ErrorCode::JobNotFound,
            ApiError::JobCancelled => ErrorCode::JobCancelled,
            ApiError::Configuration(_) => ErrorCode::ConfigurationError,
            ApiError::RateLimited(_) => ErrorCode::RateLimitExceeded,
            ApiError::Internal(_) | ApiError::Store(_) => ErrorCode::InternalError,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The `{error:{code,message,details?}}` envelope every error response uses.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: sanitize_message(&message.into()),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = ErrorEnvelope::new(self.code(), self.to_string());

        if let ApiError::RateLimited(decision) = &self {
            let headers = [
                ("X-RateLimit-Limit", decision.limit.to_string()),
                ("X-RateLimit-Remaining", decision.remaining.to_string()),
                ("X-RateLimit-Reset", (decision.reset_at_ms / 1000).to_string()),
                ("Retry-After", decision.retry_after_seconds().to_string()),
            ];
            return (status, headers, Json(envelope)).into_response();
        }

        (status, Json(envelope)).into_response()
    }
}
