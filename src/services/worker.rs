use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::job::JobStatus;
use crate::services::lifecycle::{Completion, JobLifecycle};
use crate::services::prompt;
use crate::services::renderer::{ImageRenderer, RenderError};

/// Default bound on a single render call.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of one worker invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    /// No pending job was available.
    Idle,
    /// A job was claimed and rendered. `status` is `None` if the
    /// completion was dropped as stale.
    Processed { job_id: Uuid, status: Option<JobStatus> },
}

impl WorkerOutcome {
    pub fn processed(&self) -> bool {
        matches!(self, WorkerOutcome::Processed { .. })
    }
}

/// Claims one pending job per invocation and renders it.
pub struct GenerationWorker {
    lifecycle: JobLifecycle,
    renderer: Arc<dyn ImageRenderer>,
    render_timeout: Duration,
    enrich_prompt: bool,
}

impl GenerationWorker {
    pub fn new(lifecycle: JobLifecycle, renderer: Arc<dyn ImageRenderer>) -> Self {
        Self {
            lifecycle,
            renderer,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            enrich_prompt: true,
        }
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_prompt_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_prompt = enabled;
        self
    }

    /// Process at most one job. Render failures end up on the job; only
    /// store failures are returned as errors.
    pub async fn run_once(&self) -> Result<WorkerOutcome, StoreError> {
        let Some(job) = self.lifecycle.claim_next().await? else {
            debug!("No pending image jobs");
            return Ok(WorkerOutcome::Idle);
        };

        let prompt = if self.enrich_prompt {
            prompt::enrich(&job.prompt)
        } else {
            job.prompt.clone()
        };

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.render_timeout, self.renderer.render(&prompt))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.render_timeout)),
        };
        let elapsed = start.elapsed();
        metrics::histogram!("image_render_seconds").record(elapsed.as_secs_f64());

        info!(
            job_id = %job.id,
            render_duration_ms = elapsed.as_millis() as u64,
            success = outcome.is_ok(),
            "Render call finished"
        );

        let status = match self.lifecycle.complete(job.id, outcome).await? {
            Completion::Done(job) | Completion::Failed(job) => Some(job.status),
            Completion::Stale => None,
        };

        Ok(WorkerOutcome::Processed {
            job_id: job.id,
            status,
        })
    }
}
