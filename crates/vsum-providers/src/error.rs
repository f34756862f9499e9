//! Provider error types and their mapping onto the client-facing taxonomy.

use thiserror::Error;

use vsum_models::{ErrorCode, ErrorProvider, JobError};

/// Failures observed while talking to the transcript provider.
#[derive(Debug, Clone, Error)]
pub enum TranscriptError {
    #[error("Provider rejected the request: {0}")]
    InvalidRequest(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Transcript provider error: {0}")]
    Upstream(String),
}

impl TranscriptError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TranscriptError::InvalidRequest(_) => ErrorCode::SupadataInvalidRequest,
            TranscriptError::VideoUnavailable(_) => ErrorCode::VideoUnavailable,
            TranscriptError::TranscriptUnavailable(_) => ErrorCode::TranscriptUnavailable,
            TranscriptError::Upstream(_) => ErrorCode::SupadataUpstreamError,
        }
    }

    /// Attribute this failure to the transcript provider on a job record.
    pub fn into_job_error(self) -> JobError {
        JobError::new(self.code(), self.to_string(), ErrorProvider::Transcript)
    }
}

/// Failures observed while talking to the summarizer.
#[derive(Debug, Clone, Error)]
pub enum SummarizeError {
    #[error("Summarizer authentication failed: {0}")]
    Auth(String),

    #[error("Summarizer quota exhausted: {0}")]
    Quota(String),

    #[error("Summarizer returned malformed output: {0}")]
    InvalidResponse(String),

    #[error("Summarizer error: {0}")]
    Upstream(String),
}

impl SummarizeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SummarizeError::Auth(_) => ErrorCode::GeminiAuth,
            SummarizeError::Quota(_) => ErrorCode::GeminiQuota,
            SummarizeError::InvalidResponse(_) => ErrorCode::GeminiInvalidResponse,
            SummarizeError::Upstream(_) => ErrorCode::GeminiUpstreamError,
        }
    }

    /// Attribute this failure to the summarizer on a job record.
    pub fn into_job_error(self) -> JobError {
        JobError::new(self.code(), self.to_string(), ErrorProvider::Summarizer)
    }
}
