//! Summary result types and output validation.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ErrorProvider, JobError};
use crate::limits::{KeyPointBounds, SummaryBudgets};
use crate::request::SummaryLength;

/// Raw structured output from a summarizer call, before re-validation.
///
/// `confidence` is deliberately wide: the adapter reports whatever the model
/// emitted and the core decides whether it is in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDraft {
    pub summary: String,
    pub key_points: Vec<String>,
    pub confidence: i64,
}

/// Validated summary attached to a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    /// Abstractive paragraph (or bullet list, per the requested format).
    pub summary: String,
    /// Key takeaways, bounded by the configured key-point window.
    pub key_points: Vec<String>,
    /// Model self-reported confidence, 0-100.
    pub confidence: u8,
    /// Identifier of the model that produced the summary.
    pub model_id: String,
}

/// Metadata attached to completed responses and cache entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_langs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Re-validate summarizer output against the configured bounds.
///
/// The adapter is expected to produce strictly valid structured output;
/// this is the core's independent check, applied after every call.
/// Violations surface as `GEMINI_INVALID_RESPONSE` on the job. On success
/// the draft is promoted to a [`SummaryResult`] carrying the model id.
pub fn validate_summary(
    draft: SummaryDraft,
    length: SummaryLength,
    budgets: &SummaryBudgets,
    key_points: &KeyPointBounds,
    model_id: &str,
) -> Result<SummaryResult, JobError> {
    let budget = budgets.for_length(length);
    let summary_len = draft.summary.chars().count();

    if summary_len < budget.min_chars || summary_len > budget.max_chars {
        return Err(invalid(format!(
            "summary length {} outside [{}, {}] for {}",
            summary_len,
            budget.min_chars,
            budget.max_chars,
            length.as_str()
        )));
    }

    let count = draft.key_points.len();
    if count < key_points.min || count > key_points.max {
        return Err(invalid(format!(
            "key point count {} outside [{}, {}]",
            count, key_points.min, key_points.max
        )));
    }
    if draft.key_points.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid("empty key point"));
    }

    if !(0..=100).contains(&draft.confidence) {
        return Err(invalid(format!(
            "confidence {} outside [0, 100]",
            draft.confidence
        )));
    }

    Ok(SummaryResult {
        summary: draft.summary,
        key_points: draft.key_points,
        confidence: draft.confidence as u8,
        model_id: model_id.to_string(),
    })
}

fn invalid(message: impl Into<String>) -> JobError {
    JobError::new(
        ErrorCode::GeminiInvalidResponse,
        message,
        ErrorProvider::Summarizer,
    )
}
