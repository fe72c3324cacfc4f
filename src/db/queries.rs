use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use super::{JobStore, StoreError, UpdateOutcome};
use crate::models::generation::Prompt;
use crate::models::job::{ImageJob, JobStatus};

/// PostgreSQL-backed job store over the `image_jobs` table.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    prompt: String,
    status: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for ImageJob {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_str(&row.status)
            .map_err(|_| StoreError::Corrupt(format!("unknown job status `{}`", row.status)))?;

        Ok(Self {
            id: row.id,
            prompt: row.prompt,
            status,
            result_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, prompt: &Prompt) -> Result<ImageJob, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO image_jobs (id, prompt, status)
            VALUES ($1, $2, 'pending')
            RETURNING id, prompt, status, image_url, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(prompt.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> Result<Option<ImageJob>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, prompt, status, image_url, created_at, updated_at
            FROM image_jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageJob::try_from).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        expected: JobStatus,
        status: JobStatus,
        result_url: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        // The status guard in the WHERE clause is the compare-and-swap.
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE image_jobs
            SET status = $3,
                image_url = $4,
                updated_at = clock_timestamp()
            WHERE id = $1 AND status = $2
            RETURNING id, prompt, status, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(expected.as_ref())
        .bind(status.as_ref())
        .bind(result_url)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(UpdateOutcome::Updated(row.try_into()?));
        }

        Ok(match self.get(id).await? {
            Some(current) => UpdateOutcome::StatusMismatch(current),
            None => UpdateOutcome::NotFound,
        })
    }

    async fn next_pending(&self) -> Result<Option<ImageJob>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, prompt, status, image_url, created_at, updated_at
            FROM image_jobs
            WHERE status = 'pending'
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(ImageJob::try_from).transpose()
    }

    async fn list_done(&self, limit: i64) -> Result<Vec<ImageJob>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, prompt, status, image_url, created_at, updated_at
            FROM image_jobs
            WHERE status = 'done'
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ImageJob::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
