//! Tunable bounds for chunking and summary validation.

use serde::{Deserialize, Serialize};

use crate::request::SummaryLength;

/// Character budget for one summary length tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBudget {
    pub min_chars: usize,
    pub max_chars: usize,
}

/// Per-tier summary character budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBudgets {
    pub short: LengthBudget,
    pub standard: LengthBudget,
    pub detailed: LengthBudget,
}

impl Default for SummaryBudgets {
    fn default() -> Self {
        Self {
            short: LengthBudget {
                min_chars: 200,
                max_chars: 800,
            },
            standard: LengthBudget {
                min_chars: 500,
                max_chars: 2000,
            },
            detailed: LengthBudget {
                min_chars: 1000,
                max_chars: 4000,
            },
        }
    }
}

impl SummaryBudgets {
    pub fn for_length(&self, length: SummaryLength) -> LengthBudget {
        match length {
            SummaryLength::Short => self.short,
            SummaryLength::Standard => self.standard,
            SummaryLength::Detailed => self.detailed,
        }
    }
}

/// Transcript chunking thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLimits {
    /// Transcripts at or below this length are summarized in one call.
    pub transcript_max_chars: usize,
    /// Lower bound a non-terminal chunk must reach before a split.
    pub chunk_min_chars: usize,
    /// Upper bound no chunk may exceed.
    pub chunk_max_chars: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            transcript_max_chars: 80_000,
            chunk_min_chars: 20_000,
            chunk_max_chars: 60_000,
        }
    }
}

/// Bounds enforced on the summarizer's key-point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPointBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for KeyPointBounds {
    fn default() -> Self {
        Self { min: 5, max: 9 }
    }
}
