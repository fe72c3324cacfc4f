use std::sync::Arc;
use tiny_home_ai::{
    config::AppConfig,
    db::{self, PgJobStore},
    services::{
        lifecycle::JobLifecycle,
        renderer::OpenAiImageClient,
        worker::{GenerationWorker, WorkerOutcome},
    },
};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting image generation worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");
    let database_url = config
        .database_url
        .as_deref()
        .expect("DATABASE_URL is required for the worker");

    // Initialize database
    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let renderer = OpenAiImageClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
        &config.image_model,
        &config.image_size,
        config.render_timeout(),
    )
    .expect("Failed to initialize image generation client");

    let lifecycle = JobLifecycle::new(Arc::new(PgJobStore::new(db_pool)));
    let worker = GenerationWorker::new(lifecycle, Arc::new(renderer))
        .with_render_timeout(config.render_timeout())
        .with_prompt_enrichment(config.enrich_prompt);
    let poll_interval = config.worker_poll_interval();

    tracing::info!("Worker ready, starting job processing loop");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Main processing loop
    loop {
        let idle = match worker.run_once().await {
            Ok(WorkerOutcome::Processed { job_id, status }) => {
                tracing::debug!(%job_id, ?status, "Job processed, checking for next job");
                false
            }
            Ok(WorkerOutcome::Idle) => {
                tracing::trace!("No jobs available, sleeping");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Job store error, will retry");
                true
            }
        };

        let pause = if idle { poll_interval } else { std::time::Duration::ZERO };
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping worker");
                break;
            }
            _ = sleep(pause) => {}
        }
    }
}
