use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// GET /metrics: Job counters and render latency in Prometheus text format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for the metrics emitted by the job lifecycle.
pub fn describe() {
    metrics::describe_counter!("image_jobs_submitted_total", "Image jobs submitted");
    metrics::describe_counter!("image_jobs_completed_total", "Image jobs rendered successfully");
    metrics::describe_counter!("image_jobs_failed_total", "Image jobs whose render failed");
    metrics::describe_counter!(
        "image_jobs_stale_completions_total",
        "Render results dropped because the job had left processing"
    );
    metrics::describe_histogram!(
        "image_render_seconds",
        metrics::Unit::Seconds,
        "Wall time of a single render call"
    );
}
