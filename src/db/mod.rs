use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::models::generation::Prompt;
use crate::models::job::{ImageJob, JobStatus};

pub mod memory;
pub mod queries;

pub use memory::MemoryJobStore;
pub use queries::PgJobStore;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Result of a conditional status update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The job was in the expected status and has been rewritten.
    Updated(ImageJob),
    /// The job exists but had moved on; nothing was written.
    StatusMismatch(ImageJob),
    NotFound,
}

/// Durable record of job state. Pure data access, no transition policy.
///
/// `update` must be atomic with respect to its `expected` guard: of two
/// concurrent calls with the same guard only one may observe `Updated`.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job in the `Pending` state.
    async fn create(&self, prompt: &Prompt) -> Result<ImageJob, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ImageJob>, StoreError>;

    /// Set `status` and `result_url` iff the job is currently `expected`.
    async fn update(
        &self,
        id: Uuid,
        expected: JobStatus,
        status: JobStatus,
        result_url: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Oldest `Pending` job in submission order.
    async fn next_pending(&self) -> Result<Option<ImageJob>, StoreError>;

    /// `Done` jobs, newest first.
    async fn list_done(&self, limit: i64) -> Result<Vec<ImageJob>, StoreError>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt job record: {0}")]
    Corrupt(String),
}
