//! External provider ports and adapters.
//!
//! The transcript service and the generative model are modeled as
//! capabilities behind traits; the HTTP adapters translate wire outcomes
//! into the service's error taxonomy. The chunk-and-reduce engine sits on
//! top of the summarizer port and owns the map/reduce strategy for
//! oversize transcripts.

pub mod engine;
pub mod error;
pub mod gemini;
pub mod supadata;
pub mod summarizer;
pub mod transcript;

pub use engine::SummaryEngine;
pub use error::{SummarizeError, TranscriptError};
pub use gemini::GeminiClient;
pub use supadata::SupadataClient;
pub use summarizer::Summarizer;
pub use transcript::{TranscriptPayload, TranscriptPoll, TranscriptOutcome, TranscriptProvider};
