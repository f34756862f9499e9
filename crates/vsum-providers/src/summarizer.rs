//! Summarizer port.

use async_trait::async_trait;

use vsum_models::{SummaryDraft, SummaryFormat, SummaryLength};

use crate::error::SummarizeError;

/// Capability to turn transcript text into a structured summary draft.
///
/// Adapters are expected to produce strictly valid structured output; the
/// engine re-validates every draft against the configured budgets anyway.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        length: SummaryLength,
        format: SummaryFormat,
    ) -> Result<SummaryDraft, SummarizeError>;

    /// Identifier echoed as `modelId` in results.
    fn model_id(&self) -> &str;
}
