//! Error taxonomy surfaced to clients.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable error codes carried in the API error envelope and on failed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    JobNotFound,
    JobCancelled,
    ConfigurationError,
    RateLimitExceeded,
    VideoUnavailable,
    TranscriptUnavailable,
    SupadataInvalidRequest,
    SupadataUpstreamError,
    GeminiAuth,
    GeminiQuota,
    GeminiUpstreamError,
    GeminiInvalidResponse,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::JobNotFound => "JOB_NOT_FOUND",
            ErrorCode::JobCancelled => "JOB_CANCELLED",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::VideoUnavailable => "VIDEO_UNAVAILABLE",
            ErrorCode::TranscriptUnavailable => "TRANSCRIPT_UNAVAILABLE",
            ErrorCode::SupadataInvalidRequest => "SUPADATA_INVALID_REQUEST",
            ErrorCode::SupadataUpstreamError => "SUPADATA_UPSTREAM_ERROR",
            ErrorCode::GeminiAuth => "GEMINI_AUTH",
            ErrorCode::GeminiQuota => "GEMINI_QUOTA",
            ErrorCode::GeminiUpstreamError => "GEMINI_UPSTREAM_ERROR",
            ErrorCode::GeminiInvalidResponse => "GEMINI_INVALID_RESPONSE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which collaborator a job-scoped failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorProvider {
    Transcript,
    Summarizer,
    Backend,
}

/// Error recorded on a failed job and returned by GET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub code: ErrorCode,
    pub message: String,
    pub provider: ErrorProvider,
}

impl JobError {
    /// Build a job error with the client-facing message sanitized.
    pub fn new(code: ErrorCode, message: impl Into<String>, provider: ErrorProvider) -> Self {
        Self {
            code,
            message: sanitize_message(&message.into()),
            provider,
        }
    }
}

fn api_key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)api[_-]?key[=:]\s*\S+").expect("valid regex"))
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("valid regex"))
}

/// Scrub credentials and absolute URLs out of user-visible messages.
///
/// Any `api_key=...`/`api-key: ...` fragment becomes `API_KEY`; any absolute
/// URL becomes `[URL]`. Applied to every message that can reach a client.
pub fn sanitize_message(message: &str) -> String {
    let scrubbed = api_key_pattern().replace_all(message, "API_KEY");
    url_pattern().replace_all(&scrubbed, "[URL]").into_owned()
}
