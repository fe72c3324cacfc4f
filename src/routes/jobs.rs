use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::generation::{
    JobStatusResponse, ProcessResponse, StatusQuery, SubmitRequest, SubmitResponse,
};

/// POST /api/v1/jobs: Queue a prompt for rendering.
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected submission payload");
        AppError::Validation("Prompt is required".to_string())
    })?;

    let job = state.jobs.submit(&request.prompt).await?;

    Ok(Json(SubmitResponse {
        job_id: job.id,
        status: job.status,
    }))
}

/// GET /api/v1/jobs/status?jobId=: Check job status.
pub async fn get_job_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let raw_id = query
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job ID is required".to_string()))?;

    // Identifiers are opaque to callers: anything unparseable is simply unknown.
    let job_id = Uuid::parse_str(raw_id.trim()).map_err(|_| AppError::NotFound)?;
    let job = state.jobs.status(job_id).await?;

    Ok(Json(JobStatusResponse::from(&job)))
}

/// POST /api/v1/jobs/process: Run one worker invocation.
///
/// The invocation runs on its own task so a claimed job is still completed
/// when the caller disconnects mid-render.
pub async fn process_next_job(
    State(state): State<AppState>,
) -> Result<Json<ProcessResponse>, AppError> {
    let worker = Arc::clone(&state.worker);
    let outcome = tokio::spawn(async move { worker.run_once().await }).await??;

    Ok(Json(ProcessResponse {
        processed: outcome.processed(),
    }))
}

/// Fallback for unsupported methods on job routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
