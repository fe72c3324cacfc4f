//! Job state machine.
//!
//! All writes go through [`JobStore::update`] with the current status as the
//! guard, so a claim is won by exactly one caller and a completion from a
//! worker whose job has moved on is dropped instead of applied.

use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::db::{JobStore, StoreError, UpdateOutcome};
use crate::error::AppError;
use crate::models::generation::Prompt;
use crate::models::job::{ImageJob, JobStatus};
use crate::services::renderer::RenderError;

/// Upper bound on claim attempts per invocation when other workers keep
/// winning the race for the oldest pending job.
const MAX_CLAIM_ATTEMPTS: usize = 8;

/// What a completion attempt did to the job.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Done(ImageJob),
    Failed(ImageJob),
    /// The job was no longer `Processing`; nothing was written.
    Stale,
}

#[derive(Clone)]
pub struct JobLifecycle {
    store: Arc<dyn JobStore>,
}

impl JobLifecycle {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Validate a raw prompt and create a `Pending` job for it.
    pub async fn submit(&self, raw_prompt: &str) -> Result<ImageJob, AppError> {
        let prompt = Prompt::parse(raw_prompt).map_err(AppError::Validation)?;
        let job = self.store.create(&prompt).await?;

        metrics::counter!("image_jobs_submitted_total").increment(1);
        info!(job_id = %job.id, "Image job submitted");
        Ok(job)
    }

    pub async fn status(&self, id: Uuid) -> Result<ImageJob, AppError> {
        self.store.get(id).await?.ok_or(AppError::NotFound)
    }

    /// Done jobs, newest first.
    pub async fn gallery(&self, limit: i64) -> Result<Vec<ImageJob>, AppError> {
        Ok(self.store.list_done(limit).await?)
    }

    /// Claim the oldest pending job, moving it to `Processing`.
    ///
    /// Returns `None` when there is nothing left to claim. Losing a race
    /// moves on to the next pending job.
    pub async fn claim_next(&self) -> Result<Option<ImageJob>, StoreError> {
        for _ in 0..MAX_CLAIM_ATTEMPTS {
            let Some(candidate) = self.store.next_pending().await? else {
                return Ok(None);
            };

            match self
                .transition(candidate.id, JobStatus::Pending, JobStatus::Processing, None)
                .await?
            {
                UpdateOutcome::Updated(job) => {
                    info!(job_id = %job.id, "Claimed image job");
                    return Ok(Some(job));
                }
                UpdateOutcome::StatusMismatch(current) => {
                    info!(
                        job_id = %current.id,
                        status = %current.status,
                        "Job claimed by another worker, skipping"
                    );
                }
                UpdateOutcome::NotFound => {
                    warn!(job_id = %candidate.id, "Pending job vanished before claim");
                }
            }
        }

        warn!(
            attempts = MAX_CLAIM_ATTEMPTS,
            "Gave up claiming after repeated lost races"
        );
        Ok(None)
    }

    /// Record the render outcome of a claimed job.
    ///
    /// A successful render stores the URL in its parsed, normalized form
    /// (`Url::as_str`): the host is lowercased, an empty path becomes `/`
    /// and unsafe characters are percent-encoded.
    pub async fn complete(
        &self,
        id: Uuid,
        outcome: Result<Url, RenderError>,
    ) -> Result<Completion, StoreError> {
        let (status, result_url) = match &outcome {
            Ok(url) => (JobStatus::Done, Some(url.as_str())),
            Err(_) => (JobStatus::Failed, None),
        };

        match self
            .transition(id, JobStatus::Processing, status, result_url)
            .await?
        {
            UpdateOutcome::Updated(job) if job.status == JobStatus::Done => {
                metrics::counter!("image_jobs_completed_total").increment(1);
                info!(job_id = %id, result_url = ?job.result_url, "Image job done");
                Ok(Completion::Done(job))
            }
            UpdateOutcome::Updated(job) => {
                metrics::counter!("image_jobs_failed_total").increment(1);
                if let Err(e) = &outcome {
                    warn!(job_id = %id, error = %e, "Image job failed");
                }
                Ok(Completion::Failed(job))
            }
            UpdateOutcome::StatusMismatch(current) => {
                metrics::counter!("image_jobs_stale_completions_total").increment(1);
                warn!(
                    job_id = %id,
                    status = %current.status,
                    "Job left processing before completion, dropping result"
                );
                Ok(Completion::Stale)
            }
            UpdateOutcome::NotFound => {
                metrics::counter!("image_jobs_stale_completions_total").increment(1);
                warn!(job_id = %id, "Job disappeared before completion, dropping result");
                Ok(Completion::Stale)
            }
        }
    }

    async fn transition(
        &self,
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
        result_url: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        debug_assert!(from.can_transition_to(to), "{from} -> {to}");
        debug_assert_eq!(to == JobStatus::Done, result_url.is_some());
        self.store.update(id, from, to, result_url).await
    }
}
