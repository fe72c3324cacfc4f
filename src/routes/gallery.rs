use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::generation::GalleryResponse;

/// GET /api/v1/gallery: Finished renders, newest first.
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<GalleryResponse>, AppError> {
    let jobs = state.jobs.gallery(state.gallery_limit).await?;
    Ok(Json(GalleryResponse::from_jobs(jobs)))
}
