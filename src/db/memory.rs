use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{JobStore, StoreError, UpdateOutcome};
use crate::models::generation::Prompt;
use crate::models::job::{ImageJob, JobStatus};

/// In-process job store. Used when no `DATABASE_URL` is configured and in tests.
///
/// Every operation runs under a single mutex, so the status guard in
/// `update` is trivially atomic. Jobs are ordered by insertion sequence,
/// not by `created_at`, so wall clock adjustments cannot reorder the queue.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<Uuid, Entry>,
    next_seq: u64,
}

struct Entry {
    seq: u64,
    job: ImageJob,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, prompt: &Prompt) -> Result<ImageJob, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();
        let job = ImageJob {
            id: Uuid::new_v4(),
            prompt: prompt.as_str().to_string(),
            status: JobStatus::Pending,
            result_url: None,
            created_at: now,
            updated_at: now,
        };
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(
            job.id,
            Entry {
                seq,
                job: job.clone(),
            },
        );
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ImageJob>, StoreError> {
        Ok(self.lock().jobs.get(&id).map(|entry| entry.job.clone()))
    }

    async fn update(
        &self,
        id: Uuid,
        expected: JobStatus,
        status: JobStatus,
        result_url: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut inner = self.lock();
        let Some(entry) = inner.jobs.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if entry.job.status != expected {
            return Ok(UpdateOutcome::StatusMismatch(entry.job.clone()));
        }

        entry.job.status = status;
        entry.job.result_url = result_url.map(str::to_string);
        entry.job.updated_at = Utc::now();
        Ok(UpdateOutcome::Updated(entry.job.clone()))
    }

    async fn next_pending(&self) -> Result<Option<ImageJob>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .jobs
            .values()
            .filter(|entry| entry.job.status == JobStatus::Pending)
            .min_by_key(|entry| entry.seq)
            .map(|entry| entry.job.clone()))
    }

    async fn list_done(&self, limit: i64) -> Result<Vec<ImageJob>, StoreError> {
        let inner = self.lock();
        let mut done: Vec<&Entry> = inner
            .jobs
            .values()
            .filter(|entry| entry.job.status == JobStatus::Done)
            .collect();
        done.sort_by_key(|entry| std::cmp::Reverse(entry.seq));

        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(done
            .into_iter()
            .take(limit)
            .map(|entry| entry.job.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prompt(text: &str) -> Prompt {
        Prompt::parse(text).unwrap()
    }

    /// Simulate the wall clock stepping back between two submissions.
    fn backdate(store: &MemoryJobStore, id: Uuid, by: Duration) {
        let mut inner = store.lock();
        let entry = inner.jobs.get_mut(&id).unwrap();
        entry.job.created_at -= by;
    }

    #[tokio::test]
    async fn queue_order_follows_insertion_not_clock() {
        let store = MemoryJobStore::new();
        let older = store.create(&prompt("Older cabin")).await.unwrap();
        let newer = store.create(&prompt("Newer cabin")).await.unwrap();
        backdate(&store, newer.id, Duration::hours(1));

        let next = store.next_pending().await.unwrap().unwrap();
        assert_eq!(next.id, older.id);

        for job in [&older, &newer] {
            store
                .update(job.id, JobStatus::Pending, JobStatus::Processing, None)
                .await
                .unwrap();
            store
                .update(
                    job.id,
                    JobStatus::Processing,
                    JobStatus::Done,
                    Some("https://example/img.png"),
                )
                .await
                .unwrap();
        }

        let ids: Vec<_> = store
            .list_done(10)
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn list_done_respects_limit() {
        let store = MemoryJobStore::new();
        for text in ["One", "Two"] {
            let job = store.create(&prompt(text)).await.unwrap();
            store
                .update(job.id, JobStatus::Pending, JobStatus::Processing, None)
                .await
                .unwrap();
            store
                .update(
                    job.id,
                    JobStatus::Processing,
                    JobStatus::Done,
                    Some("https://example/img.png"),
                )
                .await
                .unwrap();
        }

        assert_eq!(store.list_done(1).await.unwrap().len(), 1);
        assert!(store.list_done(0).await.unwrap().is_empty());
    }
}
