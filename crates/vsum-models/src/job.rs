//! Job lifecycle model.
//!
//! A job is created by POST, owned by the store, and advanced by client
//! polls. Stage only moves forward (transcript -> summarize) and terminal
//! statuses never mutate again; the transition helpers enforce both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::JobError;
use crate::request::{LangPref, SummaryOptions, TranscriptMode};
use crate::summary::SummaryResult;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job is being advanced by client polls
    #[default]
    Processing,
    /// Summary produced and cached
    Completed,
    /// A classified error stopped the job
    Failed,
    /// Client cancelled via DELETE
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline stage of a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Acquiring the transcript (synchronously or via a remote job)
    #[default]
    Transcript,
    /// Turning the transcript into the final summary
    Summarize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Transcript => "transcript",
            Stage::Summarize => "summarize",
        }
    }
}

/// Original client input, kept verbatim on the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    /// Normalized video URL
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub lang: LangPref,
    #[serde(default)]
    pub options: SummaryOptions,
}

/// Transcript acquisition state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptContext {
    /// Mode forwarded to the provider
    #[serde(default)]
    pub mode: TranscriptMode,
    /// Handle of an async remote transcript job, when one was started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_job_id: Option<String>,
    /// Language the provider actually resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_lang: Option<String>,
    /// Languages the provider reported as available
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_langs: Vec<String>,
    /// Last observed remote status, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<String>,
}

/// The tracked unit of work produced by one POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub stage: Stage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub input: JobInput,
    #[serde(default)]
    pub transcript_context: TranscriptContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SummaryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

impl Job {
    /// Create a fresh job in `processing/transcript`.
    pub fn new(input: JobInput) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Processing,
            stage: Stage::Transcript,
            created_at: now,
            updated_at: now,
            transcript_context: TranscriptContext {
                mode: input.options.transcript_mode,
                ..TranscriptContext::default()
            },
            input,
            result: None,
            error: None,
        }
    }

    /// Record the handle of an async remote transcript job.
    pub fn set_remote_handle(&mut self, handle: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.transcript_context.remote_job_id = Some(handle.into());
        self.updated_at = Utc::now();
    }

    /// Record the last observed remote transcript-job status.
    pub fn set_provider_status(&mut self, status: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.transcript_context.provider_status = Some(status.into());
        self.updated_at = Utc::now();
    }

    /// Transcript is in hand: move to the summarize stage.
    ///
    /// No-op on terminal jobs; the stage never moves backwards.
    pub fn advance_to_summarize(&mut self, lang: Option<String>, available: Vec<String>) {
        if self.status.is_terminal() || self.stage == Stage::Summarize {
            return;
        }
        self.stage = Stage::Summarize;
        self.transcript_context.remote_job_id = None;
        self.transcript_context.transcript_lang = lang;
        self.transcript_context.available_langs = available;
        self.updated_at = Utc::now();
    }

    /// Terminal: summary produced.
    pub fn complete(&mut self, result: SummaryResult) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
    }

    /// Terminal: classified failure.
    pub fn fail(&mut self, error: JobError) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error);
        self.updated_at = Utc::now();
    }

    /// Terminal: explicit client cancellation.
    pub fn cancel(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == JobStatus::Cancelled
    }
}
