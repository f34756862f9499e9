//! Transcript provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vsum_models::TranscriptMode;

use crate::error::TranscriptError;

/// A transcript the provider handed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPayload {
    pub content: String,
    /// Language the provider resolved, when reported.
    pub lang: Option<String>,
    /// Languages the provider discovered for this video.
    pub available_langs: Vec<String>,
}

/// Outcome of an initial transcript request.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    /// The provider answered synchronously.
    Ready(TranscriptPayload),
    /// The provider started an async job to be polled.
    Async { remote_job_id: String },
}

/// Outcome of polling an async transcript job.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptPoll {
    Queued,
    Active,
    Completed(TranscriptPayload),
}

/// Capability to fetch a transcript synchronously or drive an async
/// transcript job. A remote failure surfaces as [`TranscriptError`], which
/// carries its own taxonomy code.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn request_transcript(
        &self,
        url: &str,
        lang: Option<&str>,
        mode: TranscriptMode,
    ) -> Result<TranscriptOutcome, TranscriptError>;

    async fn poll_job(&self, remote_job_id: &str) -> Result<TranscriptPoll, TranscriptError>;
}
