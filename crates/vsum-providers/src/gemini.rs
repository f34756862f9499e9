//! Gemini summarizer adapter.
//!
//! Calls `generateContent` with a JSON response mime type and a prompt that
//! pins the output schema. The model occasionally wraps JSON in markdown
//! code fences anyway, so those are stripped before parsing.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vsum_models::{SummaryBudgets, SummaryDraft, SummaryFormat, SummaryLength};

use crate::error::SummarizeError;
use crate::summarizer::Summarizer;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for the Gemini generateContent API.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    budgets: SummaryBudgets,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<String>,
        budgets: SummaryBudgets,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            budgets,
            client: Client::new(),
        }
    }

    /// Build the summarization prompt.
    fn build_prompt(&self, text: &str, length: SummaryLength, format: SummaryFormat) -> String {
        let budget = self.budgets.for_length(length);
        let format_instruction = match format {
            SummaryFormat::Bullets => {
                "Write the summary as concise bullet lines, one per line, each starting with '- '."
            }
            SummaryFormat::Paragraph => "Write the summary as flowing prose paragraphs.",
        };

        format!(
            r#"You summarize video transcripts.

Return ONLY a single JSON object with this schema:
{{
  "summary": "the summary text",
  "keyPoints": ["point 1", "point 2", "..."],
  "confidence": 85
}}

Requirements:
- {format_instruction}
- The summary must be between {min} and {max} characters.
- Provide 5 to 9 keyPoints, each a short non-empty sentence.
- confidence is an integer from 0 to 100 reflecting how faithfully the
  summary covers the transcript.
- Return ONLY the JSON object and nothing else.

TRANSCRIPT:
{text}
"#,
            min = budget.min_chars,
            max = budget.max_chars,
        )
    }

    /// Strip a markdown code fence if the model wrapped its JSON in one.
    fn strip_fences(text: &str) -> &str {
        let text = text.trim();
        let text = text.strip_prefix("```json").unwrap_or(text);
        let text = text.strip_prefix("```").unwrap_or(text);
        let text = text.strip_suffix("```").unwrap_or(text);
        text.trim()
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(
        &self,
        text: &str,
        length: SummaryLength,
        format: SummaryFormat,
    ) -> Result<SummaryDraft, SummarizeError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: self.build_prompt(text, length, format),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SummarizeError::Auth(format!("{}: {}", status, body))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    SummarizeError::Quota(format!("{}: {}", status, body))
                }
                _ => SummarizeError::Upstream(format!("{}: {}", status, body)),
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Upstream(format!("bad response body: {}", e)))?;

        let raw = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| SummarizeError::InvalidResponse("no content in response".into()))?;

        debug!(model = %self.model, chars = raw.len(), "Gemini response received");

        serde_json::from_str(Self::strip_fences(raw))
            .map_err(|e| SummarizeError::InvalidResponse(format!("unparsable JSON: {}", e)))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
