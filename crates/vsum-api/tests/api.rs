//! End-to-end endpoint tests against the full router, with scripted
//! providers and the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use vsum_api::{create_router, AppConfig, AppState, ProviderConfig};
use vsum_models::{SummaryDraft, SummaryFormat, SummaryLength, TranscriptMode};
use vsum_providers::{
    SummarizeError, Summarizer, TranscriptError, TranscriptOutcome, TranscriptPayload,
    TranscriptPoll, TranscriptProvider,
};
use vsum_store::{MemoryStore, RateLimitSettings, RateLimiter};

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

// ============================================================================
// Scripted providers
// ============================================================================

/// Transcript provider that always answers synchronously.
struct SyncTranscripts;

#[async_trait]
impl TranscriptProvider for SyncTranscripts {
    async fn request_transcript(
        &self,
        _url: &str,
        _lang: Option<&str>,
        _mode: TranscriptMode,
    ) -> Result<TranscriptOutcome, TranscriptError> {
        Ok(TranscriptOutcome::Ready(TranscriptPayload {
            content: "First sentence. Second sentence. Third sentence.".to_string(),
            lang: Some("en".to_string()),
            available_langs: vec!["en".to_string()],
        }))
    }

    async fn poll_job(&self, _id: &str) -> Result<TranscriptPoll, TranscriptError> {
        Err(TranscriptError::Upstream("no async jobs in this test".into()))
    }
}

/// Transcript provider that reports the partial/unavailable signal.
struct UnavailableTranscripts;

#[async_trait]
impl TranscriptProvider for UnavailableTranscripts {
    async fn request_transcript(
        &self,
        _url: &str,
        _lang: Option<&str>,
        _mode: TranscriptMode,
    ) -> Result<TranscriptOutcome, TranscriptError> {
        Err(TranscriptError::TranscriptUnavailable(
            "no captions for this video".into(),
        ))
    }

    async fn poll_job(&self, _id: &str) -> Result<TranscriptPoll, TranscriptError> {
        Err(TranscriptError::Upstream("unreachable".into()))
    }
}

struct FixedSummarizer;

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(
        &self,
        _text: &str,
        _length: SummaryLength,
        _format: SummaryFormat,
    ) -> Result<SummaryDraft, SummarizeError> {
        Ok(SummaryDraft {
            summary: "s".repeat(700),
            key_points: vec!["a key point".to_string(); 6],
            confidence: 88,
        })
    }

    fn model_id(&self) -> &str {
        "test-model"
    }
}

// ============================================================================
// Harness
// ============================================================================

fn test_config() -> AppConfig {
    AppConfig {
        providers: ProviderConfig {
            supadata_api_key: Some("sd-key".to_string()),
            gemini_api_key: Some("gm-key".to_string()),
            gemini_model: "test-model".to_string(),
            ..ProviderConfig::default()
        },
        ..AppConfig::default()
    }
}

fn make_app(
    config: AppConfig,
    transcripts: Arc<dyn TranscriptProvider>,
    limiter_enabled: bool,
) -> Router {
    let store = Arc::new(MemoryStore::new());
    let limiter = if limiter_enabled {
        RateLimiter::new(store.clone(), config.rate_limit)
    } else {
        RateLimiter::disabled(config.rate_limit)
    };
    let state = AppState::new(config, store, transcripts, Arc::new(FixedSummarizer), limiter);
    create_router(state)
}

fn default_app() -> Router {
    make_app(test_config(), Arc::new(SyncTranscripts), false)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value, axum::http::HeaderMap) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body, headers)
}

fn post_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/summaries")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(job_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/api/v1/summaries/{}", job_id))
        .body(Body::empty())
        .unwrap()
}

fn delete_request(job_id: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/summaries/{}", job_id))
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_happy_path_then_cached() {
    let app = default_app();

    // Create the job.
    let (status, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "processing");
    assert_eq!(body["stage"], "transcript");
    let job_id = body["jobId"].as_str().unwrap().to_string();

    // Poll until completion (sync provider: one poll is enough).
    let (status, body, _) = send(&app, get_request(&job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    let key_points = body["result"]["keyPoints"].as_array().unwrap();
    assert!((5..=9).contains(&key_points.len()));
    let confidence = body["result"]["confidence"].as_i64().unwrap();
    assert!((0..=100).contains(&confidence));
    assert_eq!(body["result"]["modelId"], "test-model");
    assert_eq!(body["meta"]["transcriptLang"], "en");
    let first_result = body["result"].clone();

    // Identical re-POST is served from cache, without a new job.
    let (status, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobId"], "cached");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"], first_result);
}

#[tokio::test]
async fn test_equivalent_options_hit_the_same_cache_entry() {
    let app = default_app();

    let (_, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL, "options": {} }))).await;
    let job_id = body["jobId"].as_str().unwrap().to_string();
    send(&app, get_request(&job_id)).await;

    // Spelled-out defaults land on the same fingerprint.
    let (status, body, _) = send(
        &app,
        post_request(json!({
            "url": VIDEO_URL,
            "options": {"length": "standard", "format": "bullets", "transcriptMode": "auto"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobId"], "cached");

    // A different option set misses.
    let (status, _, _) = send(
        &app,
        post_request(json!({ "url": VIDEO_URL, "options": {"length": "short"} })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let app = default_app();
    let (status, body, _) = send(&app, post_request(json!({ "url": "https://example.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_ssrf_attempt_rejected() {
    let app = default_app();
    let (status, body, _) = send(
        &app,
        post_request(json!({ "url": "https://127.0.0.1/watch?v=abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = default_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/summaries")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_bad_title_rejected() {
    let app = default_app();
    let (status, body, _) = send(
        &app,
        post_request(json!({ "url": VIDEO_URL, "title": "<b>bold</b>" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_cancellation_flow() {
    let app = default_app();

    let (_, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    // Cancel immediately.
    let (status, _, _) = send(&app, delete_request(&job_id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Every subsequent GET answers 410.
    for _ in 0..2 {
        let (status, body, _) = send(&app, get_request(&job_id)).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["error"]["code"], "JOB_CANCELLED");
    }

    // DELETE on a terminal job is a 404 no-op.
    let (status, _, _) = send(&app, delete_request(&job_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transcript_unavailable_fails_job() {
    let app = make_app(test_config(), Arc::new(UnavailableTranscripts), false);

    let (_, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let (status, body, _) = send(&app, get_request(&job_id)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error"]["code"], "TRANSCRIPT_UNAVAILABLE");
    assert_eq!(body["error"]["provider"], "transcript");

    // The failure is sticky across polls.
    let (status, body, _) = send(&app, get_request(&job_id)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn test_unknown_job_not_found() {
    let app = default_app();
    let (status, body, _) = send(&app, get_request("no-such-job")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "JOB_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_credentials_is_configuration_error() {
    let mut config = test_config();
    config.providers.gemini_api_key = None;
    let app = make_app(config, Arc::new(SyncTranscripts), false);

    let (status, body, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_post_rate_limit() {
    let mut config = test_config();
    config.rate_limit = RateLimitSettings {
        enabled: true,
        post_rpm: 2,
        get_rpm: 60,
    };
    let app = make_app(config, Arc::new(SyncTranscripts), true);

    // Two POSTs inside the window pass; the third is rejected.
    for _ in 0..2 {
        let (status, _, _) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let (status, body, headers) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(headers.get("X-RateLimit-Remaining").unwrap(), "0");
    let retry_after: i64 = headers
        .get("Retry-After")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0);
}

#[tokio::test]
async fn test_rate_headers_on_successful_responses() {
    let mut config = test_config();
    config.rate_limit = RateLimitSettings {
        enabled: true,
        post_rpm: 10,
        get_rpm: 60,
    };
    let app = make_app(config, Arc::new(SyncTranscripts), true);

    let (status, body, headers) = send(&app, post_request(json!({ "url": VIDEO_URL }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(headers.get("X-RateLimit-Limit").unwrap(), "10");
    assert_eq!(headers.get("X-RateLimit-Remaining").unwrap(), "9");
    assert!(headers.contains_key("X-RateLimit-Reset"));

    let job_id = body["jobId"].as_str().unwrap().to_string();
    let (_, _, headers) = send(&app, get_request(&job_id)).await;
    assert_eq!(headers.get("X-RateLimit-Limit").unwrap(), "60");
}

#[tokio::test]
async fn test_health() {
    let app = default_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
