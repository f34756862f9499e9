//! Chunk-and-reduce summarization engine.
//!
//! Short transcripts get a single summarizer call with the requested knobs.
//! Oversize transcripts are split on sentence boundaries, greedy-packed
//! into chunks within the configured window, summarized chunk by chunk at
//! `standard`/`paragraph` (the map step), and the joined chunk summaries
//! are summarized once more with the user's knobs (the reduce step). Only
//! the reduce output is user-visible, so the presentation preference is
//! applied there alone.

use tracing::{debug, info};

use vsum_models::{
    validate_summary, ChunkLimits, JobError, KeyPointBounds, SummaryBudgets, SummaryFormat,
    SummaryLength, SummaryResult,
};

use crate::summarizer::Summarizer;

/// Map/reduce orchestration over the summarizer port.
#[derive(Debug, Clone)]
pub struct SummaryEngine {
    limits: ChunkLimits,
    budgets: SummaryBudgets,
    key_points: KeyPointBounds,
}

impl SummaryEngine {
    pub fn new(limits: ChunkLimits, budgets: SummaryBudgets, key_points: KeyPointBounds) -> Self {
        Self {
            limits,
            budgets,
            key_points,
        }
    }

    /// Produce the final validated summary for `transcript`.
    pub async fn summarize(
        &self,
        summarizer: &dyn Summarizer,
        transcript: &str,
        length: SummaryLength,
        format: SummaryFormat,
    ) -> Result<SummaryResult, JobError> {
        if transcript.chars().count() <= self.limits.transcript_max_chars {
            let draft = summarizer
                .summarize(transcript, length, format)
                .await
                .map_err(|e| e.into_job_error())?;
            return validate_summary(
                draft,
                length,
                &self.budgets,
                &self.key_points,
                summarizer.model_id(),
            );
        }

        let chunks = pack_chunks(
            split_sentences(transcript),
            self.limits.chunk_min_chars,
            self.limits.chunk_max_chars,
        );
        info!(
            chunks = chunks.len(),
            transcript_chars = transcript.len(),
            "Transcript over single-call threshold; running map/reduce"
        );

        let mut partials = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(chunk = i, chars = chunk.len(), "Summarizing chunk");
            let draft = summarizer
                .summarize(chunk, SummaryLength::Standard, SummaryFormat::Paragraph)
                .await
                .map_err(|e| e.into_job_error())?;
            let partial = validate_summary(
                draft,
                SummaryLength::Standard,
                &self.budgets,
                &self.key_points,
                summarizer.model_id(),
            )?;
            partials.push(partial.summary);
        }

        let combined = partials.join("\n\n");
        let draft = summarizer
            .summarize(&combined, length, format)
            .await
            .map_err(|e| e.into_job_error())?;
        validate_summary(
            draft,
            length,
            &self.budgets,
            &self.key_points,
            summarizer.model_id(),
        )
    }
}

/// Split text on end-of-sentence punctuation followed by whitespace.
///
/// Each returned sentence keeps its terminal punctuation; surrounding
/// whitespace is trimmed away.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            if chars.peek().map_or(true, |next| next.is_whitespace()) {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Greedy-pack sentences into chunks.
///
/// A new chunk starts when appending the next sentence would push past
/// `max_chars` and the current chunk has already reached `min_chars`.
pub fn pack_chunks(sentences: Vec<String>, min_chars: usize, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let prospective = if current.is_empty() {
            sentence.len()
        } else {
            current.len() + 1 + sentence.len()
        };

        if prospective > max_chars && current.len() >= min_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use vsum_models::SummaryDraft;

    use crate::error::SummarizeError;

    /// Records every call and returns a budget-conforming draft.
    struct RecordingSummarizer {
        calls: Mutex<Vec<(usize, SummaryLength, SummaryFormat)>>,
        fail_with: Option<SummarizeError>,
    }

    impl RecordingSummarizer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(err: SummarizeError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(err),
            }
        }

        fn calls(&self) -> Vec<(usize, SummaryLength, SummaryFormat)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        async fn summarize(
            &self,
            text: &str,
            length: SummaryLength,
            format: SummaryFormat,
        ) -> Result<SummaryDraft, SummarizeError> {
            self.calls.lock().unwrap().push((text.len(), length, format));
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(SummaryDraft {
                summary: "s".repeat(600),
                key_points: vec!["a point".to_string(); 6],
                confidence: 80,
            })
        }

        fn model_id(&self) -> &str {
            "test-model"
        }
    }

    fn engine() -> SummaryEngine {
        SummaryEngine::new(
            ChunkLimits {
                transcript_max_chars: 200,
                chunk_min_chars: 50,
                chunk_max_chars: 120,
            },
            SummaryBudgets::default(),
            KeyPointBounds::default(),
        )
    }

    fn uniform_transcript(total_chars: usize) -> String {
        // Fixed 20-char sentences keep chunk arithmetic deterministic.
        let sentence = "alpha beta gamma de.";
        let count = total_chars / (sentence.len() + 1) + 1;
        vec![sentence; count].join(" ")
    }

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("One two. Three four! Five six? Seven");
        assert_eq!(sentences, vec!["One two.", "Three four!", "Five six?", "Seven"]);
    }

    #[test]
    fn test_split_keeps_inline_punctuation() {
        let sentences = split_sentences("Version 1.5 shipped. It works.");
        assert_eq!(sentences, vec!["Version 1.5 shipped.", "It works."]);
    }

    #[test]
    fn test_split_handles_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_chunks_cover_input() {
        let transcript = uniform_transcript(1000);
        let sentences = split_sentences(&transcript);
        let chunks = pack_chunks(sentences.clone(), 50, 120);

        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, sentences.join(" "));
    }

    #[test]
    fn test_chunk_bounds() {
        let transcript = uniform_transcript(2000);
        let chunks = pack_chunks(split_sentences(&transcript), 50, 120);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 120, "chunk too large: {}", chunk.len());
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.len() >= 50, "non-terminal chunk too small: {}", chunk.len());
        }
    }

    #[test]
    fn test_single_oversize_sentence_still_emitted() {
        let long = "x".repeat(500);
        let chunks = pack_chunks(vec![long.clone()], 50, 120);
        assert_eq!(chunks, vec![long]);
    }

    #[tokio::test]
    async fn test_short_transcript_single_call() {
        let summarizer = RecordingSummarizer::new();
        let result = engine()
            .summarize(
                &summarizer,
                "short transcript.",
                SummaryLength::Detailed,
                SummaryFormat::Paragraph,
            )
            .await;
        // Draft is 600 chars; detailed demands >= 1000, so validation fires.
        assert!(result.is_err());

        let calls = summarizer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, SummaryLength::Detailed);
        assert_eq!(calls[0].2, SummaryFormat::Paragraph);
    }

    #[tokio::test]
    async fn test_short_transcript_valid_result() {
        let summarizer = RecordingSummarizer::new();
        let result = engine()
            .summarize(
                &summarizer,
                "short transcript.",
                SummaryLength::Standard,
                SummaryFormat::Bullets,
            )
            .await
            .unwrap();
        assert_eq!(result.model_id, "test-model");
        assert_eq!(result.confidence, 80);
        assert_eq!(summarizer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_map_reduce_call_shape() {
        let summarizer = RecordingSummarizer::new();
        let transcript = uniform_transcript(400); // over the 200-char threshold

        engine()
            .summarize(
                &summarizer,
                &transcript,
                SummaryLength::Short,
                SummaryFormat::Bullets,
            )
            .await
            .ok(); // short budget may reject the fixed draft; the call shape is what matters

        let calls = summarizer.calls();
        assert!(calls.len() >= 3, "expected >= 2 map calls plus 1 reduce");

        // Map calls run at standard/paragraph.
        for call in &calls[..calls.len() - 1] {
            assert_eq!(call.1, SummaryLength::Standard);
            assert_eq!(call.2, SummaryFormat::Paragraph);
        }

        // The reduce call carries the user's knobs.
        let reduce = calls.last().unwrap();
        assert_eq!(reduce.1, SummaryLength::Short);
        assert_eq!(reduce.2, SummaryFormat::Bullets);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_job_error() {
        let summarizer =
            RecordingSummarizer::failing(SummarizeError::Quota("out of tokens".into()));
        let err = engine()
            .summarize(
                &summarizer,
                "short transcript.",
                SummaryLength::Standard,
                SummaryFormat::Bullets,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, vsum_models::ErrorCode::GeminiQuota);
        assert_eq!(err.provider, vsum_models::ErrorProvider::Summarizer);
    }
}
