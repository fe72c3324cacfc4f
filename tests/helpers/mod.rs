//! Test helper utilities: stub renderer, in-process server and client poller

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use tiny_home_ai::app_state::AppState;
use tiny_home_ai::db::{JobStore, MemoryJobStore, StoreError, UpdateOutcome};
use tiny_home_ai::models::generation::Prompt;
use tiny_home_ai::models::job::ImageJob;
use tiny_home_ai::models::generation::JobStatusResponse;
use tiny_home_ai::models::job::JobStatus;
use uuid::Uuid;
use tiny_home_ai::routes;
use tiny_home_ai::services::renderer::{ImageRenderer, RenderError};

type Reply = Box<dyn Fn() -> Result<Url, RenderError> + Send + Sync>;

/// Renderer that answers from a script and records every prompt it receives.
pub struct StubRenderer {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubRenderer {
    pub fn returning(url: &str) -> Self {
        let url = Url::parse(url).expect("stub url must be valid");
        Self::with_reply(Box::new(move || Ok(url.clone())))
    }

    pub fn failing(make_error: fn() -> RenderError) -> Self {
        Self::with_reply(Box::new(move || Err(make_error())))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before replying, to hold a job in `Processing`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageRenderer for StubRenderer {
    async fn render(&self, prompt: &str) -> Result<Url, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        (self.reply)()
    }
}

/// Fresh in-memory store plus app state around the given renderer.
pub fn memory_state(renderer: Arc<StubRenderer>) -> (Arc<MemoryJobStore>, AppState) {
    let store = Arc::new(MemoryJobStore::new());
    let dyn_store: Arc<dyn JobStore> = store.clone();
    let state = AppState::with_renderer(dyn_store, renderer, 100);
    (store, state)
}

/// Internal detail carried by every `FailingStore` error.
pub const STORE_FAILURE_DETAIL: &str = "connection refused by db-primary:5432";

/// Job store whose every operation fails.
pub struct FailingStore;

impl FailingStore {
    fn error() -> StoreError {
        StoreError::Corrupt(STORE_FAILURE_DETAIL.to_string())
    }
}

#[async_trait]
impl JobStore for FailingStore {
    async fn create(&self, _prompt: &Prompt) -> Result<ImageJob, StoreError> {
        Err(Self::error())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<ImageJob>, StoreError> {
        Err(Self::error())
    }

    async fn update(
        &self,
        _id: Uuid,
        _expected: JobStatus,
        _status: JobStatus,
        _result_url: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(Self::error())
    }

    async fn next_pending(&self) -> Result<Option<ImageJob>, StoreError> {
        Err(Self::error())
    }

    async fn list_done(&self, _limit: i64) -> Result<Vec<ImageJob>, StoreError> {
        Err(Self::error())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(Self::error())
    }
}

/// Serve the API router on an ephemeral port; returns its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, routes::router(state))
            .await
            .expect("Test server error");
    });

    format!("http://{addr}")
}

/// Poll the status endpoint until the job reaches a terminal state.
pub async fn poll_job_status(
    client: &reqwest::Client,
    base_url: &str,
    job_id: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<JobStatusResponse, Box<dyn std::error::Error>> {
    for _ in 0..max_attempts {
        let response = client
            .get(format!("{base_url}/api/v1/jobs/status"))
            .query(&[("jobId", job_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(format!("Status check failed: {error_text}").into());
        }

        let status_response = response.json::<JobStatusResponse>().await?;
        match status_response.status {
            JobStatus::Done | JobStatus::Failed => return Ok(status_response),
            JobStatus::Pending | JobStatus::Processing => sleep(interval).await,
        }
    }

    Err(format!("Job {job_id} did not finish after {max_attempts} polls").into())
}

/// Assert the `resultUrl` iff `Done` invariant on a status response.
pub fn assert_result_url_invariant(response: &JobStatusResponse) {
    assert_eq!(
        response.result_url.is_some(),
        response.status == JobStatus::Done,
        "resultUrl presence does not match status {:?}",
        response.status
    );
}
