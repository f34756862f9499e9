//! Client-facing request options.

use serde::{Deserialize, Serialize};

/// Preferred transcript language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LangPref {
    /// Let the provider pick the best available language.
    #[default]
    Auto,
    En,
    Ru,
}

impl LangPref {
    pub fn as_str(&self) -> &'static str {
        match self {
            LangPref::Auto => "auto",
            LangPref::En => "en",
            LangPref::Ru => "ru",
        }
    }

    /// Language code to forward to the transcript provider, if any.
    pub fn provider_code(&self) -> Option<&'static str> {
        match self {
            LangPref::Auto => None,
            LangPref::En => Some("en"),
            LangPref::Ru => Some("ru"),
        }
    }
}

/// Requested summary length tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Standard,
    Detailed,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Standard => "standard",
            SummaryLength::Detailed => "detailed",
        }
    }
}

/// Requested presentation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Bullets,
    Paragraph,
}

impl SummaryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFormat::Bullets => "bullets",
            SummaryFormat::Paragraph => "paragraph",
        }
    }
}

/// Transcript acquisition mode forwarded to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    /// Only published captions.
    Native,
    /// Published captions, falling back to auto-generated ones.
    #[default]
    Auto,
    /// Ask the provider to generate a transcript if none exists.
    Generate,
}

impl TranscriptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptMode::Native => "native",
            TranscriptMode::Auto => "auto",
            TranscriptMode::Generate => "generate",
        }
    }
}

/// Summary generation options supplied by the client.
///
/// All fields default, so an empty `options` object (or a missing one)
/// canonicalizes identically to one that spells the defaults out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummaryOptions {
    #[serde(default)]
    pub length: SummaryLength,
    #[serde(default)]
    pub format: SummaryFormat,
    #[serde(default)]
    pub transcript_mode: TranscriptMode,
}

impl SummaryOptions {
    /// Deterministic canonical rendering used by the cache fingerprint.
    ///
    /// Keys are fixed-order and defaults are always emitted, so two option
    /// sets that are equal as sets render identically regardless of how the
    /// client spelled them.
    pub fn canonical_string(&self, lang: LangPref) -> String {
        format!(
            "lang={};length={};format={};transcript={}",
            lang.as_str(),
            self.length.as_str(),
            self.format.as_str(),
            self.transcript_mode.as_str(),
        )
    }
}
