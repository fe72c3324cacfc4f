use std::sync::Arc;

use crate::db::JobStore;
use crate::services::{lifecycle::JobLifecycle, renderer::ImageRenderer, worker::GenerationWorker};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobLifecycle,
    pub worker: Arc<GenerationWorker>,
    pub gallery_limit: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, worker: GenerationWorker, gallery_limit: i64) -> Self {
        Self {
            jobs: JobLifecycle::new(store),
            worker: Arc::new(worker),
            gallery_limit,
        }
    }

    /// Wire a store and renderer with default worker settings.
    pub fn with_renderer(
        store: Arc<dyn JobStore>,
        renderer: Arc<dyn ImageRenderer>,
        gallery_limit: i64,
    ) -> Self {
        let worker = GenerationWorker::new(JobLifecycle::new(store.clone()), renderer);
        Self::new(store, worker, gallery_limit)
    }
}
