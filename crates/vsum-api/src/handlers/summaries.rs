//! Summary job endpoints: create, poll, cancel.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vsum_models::{
    normalize_video_url, validate_title, Job, JobError, JobId, JobInput, JobStatus, LangPref,
    Stage, SummaryMeta, SummaryOptions, SummaryResult,
};
use vsum_store::{MethodClass, RateDecision};

use crate::driver::{self, Advance};
use crate::error::{ApiError, ApiResult};
use crate::middleware::client_identity;
use crate::state::AppState;

/// Sentinel job id returned on cache hits; no job record exists behind it.
const CACHED_JOB_ID: &str = "cached";

// ============================================================================
// Types
// ============================================================================

/// POST /api/v1/summaries request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSummaryRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lang: LangPref,
    #[serde(default)]
    pub options: SummaryOptions,
}

/// Client-facing view of a job, shaped per endpoint contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProjection {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SummaryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SummaryMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

impl JobProjection {
    /// Projection of a live job record.
    fn of_job(job: &Job) -> Self {
        let in_flight = job.status == JobStatus::Processing;
        let meta = job.result.is_some().then(|| SummaryMeta {
            transcript_lang: job.transcript_context.transcript_lang.clone(),
            available_langs: job.transcript_context.available_langs.clone(),
            title: job.input.title.clone(),
        });
        Self {
            job_id: job.id.to_string(),
            status: job.status,
            stage: in_flight.then_some(job.stage),
            provider_status: in_flight
                .then(|| job.transcript_context.provider_status.clone())
                .flatten(),
            result: job.result.clone(),
            meta,
            error: job.error.clone(),
        }
    }

    /// Synthetic completed projection for a cache hit.
    fn of_cache_hit(result: SummaryResult, meta: SummaryMeta) -> Self {
        Self {
            job_id: CACHED_JOB_ID.to_string(),
            status: JobStatus::Completed,
            stage: None,
            provider_status: None,
            result: Some(result),
            meta: Some(meta),
            error: None,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/summaries
///
/// Validates the input, consults the result cache, and on a miss persists a
/// fresh job in `processing/transcript`.
///
/// Returns:
/// - 200: cache hit with the prior result (`jobId: "cached"`)
/// - 202: new job created
/// - 400: input failed validation
/// - 429: over the POST quota
/// - 500: missing provider credentials
pub async fn create_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateSummaryRequest>, JsonRejection>,
) -> ApiResult<Response> {
    state
        .config
        .providers
        .ensure_complete()
        .map_err(ApiError::Configuration)?;

    let Json(body) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;

    let identity = client_identity(&headers);
    let decision = state.limiter.check(MethodClass::Post, &identity).await;
    if !decision.allowed {
        return Err(ApiError::RateLimited(decision));
    }

    let url = normalize_video_url(&body.url, &state.url_policy)
        .map_err(|e| ApiError::invalid_request(e.to_string()))?;
    if let Some(title) = &body.title {
        validate_title(title)
            .map_err(|_| ApiError::invalid_request("title must be 1-120 plain characters"))?;
    }

    // A cache hit is served as a synthetic completed projection without
    // materializing a job record.
    if let Some(entry) = state.cache.lookup(&url, body.lang, &body.options).await? {
        info!(url = %url, "Cache hit");
        return Ok(with_rate_headers(
            StatusCode::OK,
            &decision,
            JobProjection::of_cache_hit(entry.result, entry.meta),
        ));
    }

    let job = Job::new(JobInput {
        url,
        title: body.title,
        lang: body.lang,
        options: body.options,
    });
    state.jobs.save(&job).await?;
    info!(job_id = %job.id, "Job created");

    Ok(with_rate_headers(
        StatusCode::ACCEPTED,
        &decision,
        JobProjection::of_job(&job),
    ))
}

/// GET /api/v1/summaries/{jobId}
///
/// Terminal jobs return their projection; processing jobs are advanced by
/// one step before answering.
///
/// Returns:
/// - 200: completed, with result and meta
/// - 202: still processing
/// - 404: unknown or expired id
/// - 410: cancelled
/// - 429: over the GET quota
/// - 500: job failed (envelope carries the job error)
pub async fn get_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    state
        .config
        .providers
        .ensure_complete()
        .map_err(ApiError::Configuration)?;

    let identity = client_identity(&headers);
    let decision = state.limiter.check(MethodClass::Get, &identity).await;
    if !decision.allowed {
        return Err(ApiError::RateLimited(decision));
    }

    let id = JobId::from_string(job_id);
    let job = state.jobs.load(&id).await?.ok_or(ApiError::JobNotFound)?;

    if job.is_cancelled() {
        return Err(ApiError::JobCancelled);
    }
    if job.is_terminal() {
        return Ok(respond_for_job(&job, &decision));
    }

    match driver::advance(&state, job).await? {
        Advance::InFlight(job) | Advance::Completed(job) | Advance::Failed(job) => {
            Ok(respond_for_job(&job, &decision))
        }
        Advance::Cancelled => Err(ApiError::JobCancelled),
    }
}

/// DELETE /api/v1/summaries/{jobId}
///
/// Returns 204 after flipping a processing job to `cancelled`; 404 when the
/// job is unknown, expired or already terminal.
pub async fn cancel_summary(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = JobId::from_string(job_id);
    let mut job = state.jobs.load(&id).await?.ok_or(ApiError::JobNotFound)?;

    if job.is_terminal() {
        return Err(ApiError::JobNotFound);
    }

    job.cancel();
    state.jobs.save(&job).await?;
    info!(job_id = %job.id, "Job cancelled");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

/// Status code for a job projection per the endpoint contract.
fn respond_for_job(job: &Job, decision: &RateDecision) -> Response {
    let status = match job.status {
        JobStatus::Processing => StatusCode::ACCEPTED,
        JobStatus::Completed => StatusCode::OK,
        JobStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        // Cancelled jobs are answered with the 410 envelope before this.
        JobStatus::Cancelled => StatusCode::GONE,
    };
    with_rate_headers(status, decision, JobProjection::of_job(job))
}

/// Attach the `X-RateLimit-*` accounting headers to a response.
fn with_rate_headers(
    status: StatusCode,
    decision: &RateDecision,
    body: JobProjection,
) -> Response {
    let headers = [
        ("X-RateLimit-Limit", decision.limit.to_string()),
        ("X-RateLimit-Remaining", decision.remaining.to_string()),
        ("X-RateLimit-Reset", (decision.reset_at_ms / 1000).to_string()),
    ];
    (status, headers, Json(body)).into_response()
}
