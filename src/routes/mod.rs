use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

pub mod gallery;
pub mod health;
pub mod jobs;
pub mod metrics;

/// API routes, without the metrics endpoint or middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/jobs",
            post(jobs::submit_job).fallback(jobs::method_not_allowed),
        )
        .route("/api/v1/jobs/status", get(jobs::get_job_status))
        .route(
            "/api/v1/jobs/process",
            post(jobs::process_next_job).fallback(jobs::method_not_allowed),
        )
        .route("/api/v1/gallery", get(gallery::list_gallery))
        .with_state(state)
}
