//! Core domain types for the video summary service.
//!
//! This crate defines the job model, request options, summary results,
//! the error taxonomy and the URL/title validation rules. It has no I/O;
//! everything here is shared by the store, provider and API crates.

pub mod error;
pub mod job;
pub mod limits;
pub mod request;
pub mod summary;
pub mod url;

pub use error::{sanitize_message, ErrorCode, ErrorProvider, JobError};
pub use job::{Job, JobId, JobInput, JobStatus, Stage, TranscriptContext};
pub use limits::{ChunkLimits, KeyPointBounds, LengthBudget, SummaryBudgets};
pub use request::{LangPref, SummaryFormat, SummaryLength, SummaryOptions, TranscriptMode};
pub use summary::{validate_summary, SummaryDraft, SummaryMeta, SummaryResult};
pub use url::{normalize_video_url, validate_title, UrlPolicy, UrlValidationError};
