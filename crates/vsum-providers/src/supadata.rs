//! Supadata transcript provider adapter.
//!
//! Wire behavior: `GET /transcript` answers 200 with the transcript when the
//! provider can serve it synchronously, or 202 with a job id to poll at
//! `GET /transcript/{jobId}`. Error bodies carry a machine-readable `error`
//! slug which is mapped onto the service taxonomy here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use vsum_models::TranscriptMode;

use crate::error::TranscriptError;
use crate::transcript::{TranscriptOutcome, TranscriptPayload, TranscriptPoll, TranscriptProvider};

const DEFAULT_BASE_URL: &str = "https://api.supadata.ai/v1";

/// HTTP client for the Supadata transcript API.
pub struct SupadataClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default, rename = "availableLangs")]
    available_langs: Vec<String>,
    #[serde(default, rename = "jobId")]
    job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobStatusResponse {
    status: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default, rename = "availableLangs")]
    available_langs: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SupadataClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: Client::new(),
        }
    }

    async fn classify_error(status: StatusCode, response: reqwest::Response) -> TranscriptError {
        let body: ErrorBody = response.json().await.unwrap_or_default();
        let slug = body.error.unwrap_or_default();
        let message = body.message.unwrap_or_else(|| format!("status {}", status));

        match (status, slug.as_str()) {
            (_, "video-not-found") | (_, "video-unavailable") => {
                TranscriptError::VideoUnavailable(message)
            }
            (StatusCode::FORBIDDEN | StatusCode::NOT_FOUND, _) => {
                TranscriptError::VideoUnavailable(message)
            }
            (_, "transcript-unavailable") => TranscriptError::TranscriptUnavailable(message),
            (StatusCode::PARTIAL_CONTENT, _) => TranscriptError::TranscriptUnavailable(message),
            (StatusCode::BAD_REQUEST, _) => TranscriptError::InvalidRequest(message),
            _ => TranscriptError::Upstream(format!("{}: {}", status, message)),
        }
    }
}

#[async_trait]
impl TranscriptProvider for SupadataClient {
    async fn request_transcript(
        &self,
        url: &str,
        lang: Option<&str>,
        mode: TranscriptMode,
    ) -> Result<TranscriptOutcome, TranscriptError> {
        let endpoint = format!("{}/transcript", self.base_url);
        let mut query: Vec<(&str, &str)> =
            vec![("url", url), ("text", "true"), ("mode", mode.as_str())];
        if let Some(lang) = lang {
            query.push(("lang", lang));
        }

        let response = self
            .client
            .get(&endpoint)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| TranscriptError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body: TranscriptResponse = response
                    .json()
                    .await
                    .map_err(|e| TranscriptError::Upstream(format!("bad response body: {}", e)))?;
                let content = body.content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
                    TranscriptError::TranscriptUnavailable("provider returned no content".into())
                })?;
                Ok(TranscriptOutcome::Ready(TranscriptPayload {
                    content,
                    lang: body.lang,
                    available_langs: body.available_langs,
                }))
            }
            StatusCode::ACCEPTED => {
                let body: TranscriptResponse = response
                    .json()
                    .await
                    .map_err(|e| TranscriptError::Upstream(format!("bad response body: {}", e)))?;
                let remote_job_id = body.job_id.ok_or_else(|| {
                    TranscriptError::Upstream("202 without a job id".into())
                })?;
                debug!(remote_job_id = %remote_job_id, "Transcript job started");
                Ok(TranscriptOutcome::Async { remote_job_id })
            }
            _ => Err(Self::classify_error(status, response).await),
        }
    }

    async fn poll_job(&self, remote_job_id: &str) -> Result<TranscriptPoll, TranscriptError> {
        let endpoint = format!("{}/transcript/{}", self.base_url, remote_job_id);

        let response = self
            .client
            .get(&endpoint)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscriptError::Upstream(format!("poll failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_error(status, response).await);
        }

        let body: JobStatusResponse = response
            .json()
            .await
            .map_err(|e| TranscriptError::Upstream(format!("bad poll body: {}", e)))?;

        match body.status.as_str() {
            "queued" => Ok(TranscriptPoll::Queued),
            "active" => Ok(TranscriptPoll::Active),
            "completed" => {
                let content = body.content.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
                    TranscriptError::TranscriptUnavailable("completed job had no content".into())
                })?;
                Ok(TranscriptPoll::Completed(TranscriptPayload {
                    content,
                    lang: body.lang,
                    available_langs: body.available_langs,
                }))
            }
            "failed" => {
                let slug = body.error.unwrap_or_default();
                Err(match slug.as_str() {
                    "video-not-found" | "video-unavailable" => {
                        TranscriptError::VideoUnavailable(slug)
                    }
                    "transcript-unavailable" => TranscriptError::TranscriptUnavailable(slug),
                    "" => TranscriptError::Upstream("remote job failed".into()),
                    other => TranscriptError::Upstream(format!("remote job failed: {}", other)),
                })
            }
            other => Err(TranscriptError::Upstream(format!(
                "unknown job status '{}'",
                other
            ))),
        }
    }
}
