//! Polling-driven job progress engine.
//!
//! Progress happens only inside a GET poll: the driver loads the job,
//! performs at most one transcript call for the transcript stage, and once
//! a transcript is in hand runs the summarize stage to completion within
//! the same request. Transcripts live in memory only; they are never
//! written to the store.
//!
//! Cancellation is cooperative. The job is re-read before every persist and
//! the pending mutation is dropped if a DELETE won the race, so an upstream
//! result that lands after a cancel never mutates the job.

use tracing::{info, warn};

use vsum_models::{
    ErrorCode, ErrorProvider, Job, JobError, JobId, Stage, SummaryMeta,
};
use vsum_providers::{TranscriptOutcome, TranscriptPayload, TranscriptPoll};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Outcome of advancing a job by one poll.
#[derive(Debug)]
pub enum Advance {
    /// Still processing; the projection reflects the latest known state.
    InFlight(Job),
    Completed(Job),
    Failed(Job),
    /// A concurrent DELETE won; the poll's work was discarded.
    Cancelled,
}

/// Advance a non-terminal job by one step.
pub async fn advance(state: &AppState, job: Job) -> ApiResult<Advance> {
    match job.stage {
        Stage::Transcript => transcript_stage(state, job).await,
        // A summarize-stage job can only be observed across polls if the
        // request that held the transcript died before finishing. The
        // transcript is gone with it.
        Stage::Summarize => {
            fail(
                state,
                &job.id,
                JobError::new(
                    ErrorCode::TranscriptUnavailable,
                    "transcript was not retained; submit the video again",
                    ErrorProvider::Backend,
                ),
            )
            .await
        }
    }
}

async fn transcript_stage(state: &AppState, job: Job) -> ApiResult<Advance> {
    match job.transcript_context.remote_job_id.clone() {
        None => {
            let outcome = state
                .transcripts
                .request_transcript(
                    &job.input.url,
                    job.input.lang.provider_code(),
                    job.transcript_context.mode,
                )
                .await;

            match outcome {
                Ok(TranscriptOutcome::Ready(payload)) => {
                    summarize_stage(state, &job.id, payload).await
                }
                Ok(TranscriptOutcome::Async { remote_job_id }) => {
                    let mut current = reload(state, &job.id).await?;
                    if current.is_cancelled() {
                        return Ok(Advance::Cancelled);
                    }
                    info!(job_id = %current.id, remote = %remote_job_id, "Transcript job started upstream");
                    current.set_remote_handle(remote_job_id);
                    current.set_provider_status("queued");
                    state.jobs.save(&current).await?;
                    Ok(Advance::InFlight(current))
                }
                Err(e) => {
                    warn!(job_id = %job.id, error = %e, "Transcript request failed");
                    fail(state, &job.id, e.into_job_error()).await
                }
            }
        }
        Some(handle) => match state.transcripts.poll_job(&handle).await {
            Ok(TranscriptPoll::Queued) => {
                let mut current = job;
                current.set_provider_status("queued");
                Ok(Advance::InFlight(current))
            }
            Ok(TranscriptPoll::Active) => {
                let mut current = job;
                current.set_provider_status("active");
                Ok(Advance::InFlight(current))
            }
            Ok(TranscriptPoll::Completed(payload)) => {
                summarize_stage(state, &job.id, payload).await
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Remote transcript job failed");
                fail(state, &job.id, e.into_job_error()).await
            }
        },
    }
}

/// Transcript in hand: advance the stage and run summarization in the same
/// request, checking for cancellation before every write.
async fn summarize_stage(
    state: &AppState,
    id: &JobId,
    payload: TranscriptPayload,
) -> ApiResult<Advance> {
    let mut current = reload(state, id).await?;
    if current.is_cancelled() {
        info!(job_id = %id, "Discarding transcript for cancelled job");
        return Ok(Advance::Cancelled);
    }

    current.advance_to_summarize(payload.lang, payload.available_langs);
    state.jobs.save(&current).await?;

    let options = current.input.options;
    let summary = state
        .engine
        .summarize(
            state.summarizer.as_ref(),
            &payload.content,
            options.length,
            options.format,
        )
        .await;

    match summary {
        Ok(result) => {
            let mut latest = reload(state, id).await?;
            if latest.is_cancelled() {
                info!(job_id = %id, "Discarding summary for cancelled job");
                return Ok(Advance::Cancelled);
            }
            latest.complete(result.clone());
            state.jobs.save(&latest).await?;

            let meta = SummaryMeta {
                transcript_lang: latest.transcript_context.transcript_lang.clone(),
                available_langs: latest.transcript_context.available_langs.clone(),
                title: latest.input.title.clone(),
            };
            state
                .cache
                .store(
                    &latest.input.url,
                    latest.input.lang,
                    &latest.input.options,
                    result,
                    meta,
                )
                .await?;

            info!(job_id = %id, "Job completed");
            Ok(Advance::Completed(latest))
        }
        Err(job_error) => {
            warn!(job_id = %id, code = %job_error.code, "Summarization failed");
            fail(state, id, job_error).await
        }
    }
}

/// Record a classified failure unless a cancel won the race.
async fn fail(state: &AppState, id: &JobId, error: JobError) -> ApiResult<Advance> {
    let mut latest = reload(state, id).await?;
    if latest.is_cancelled() {
        return Ok(Advance::Cancelled);
    }
    latest.fail(error);
    state.jobs.save(&latest).await?;
    Ok(Advance::Failed(latest))
}

async fn reload(state: &AppState, id: &JobId) -> ApiResult<Job> {
    state.jobs.load(id).await?.ok_or(ApiError::JobNotFound)
}
