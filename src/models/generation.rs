use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{ImageJob, JobStatus};

/// Longest accepted prompt, in characters, after trimming.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Request to submit a prompt for rendering.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[garde(custom(non_blank), length(chars, max = MAX_PROMPT_CHARS))]
    pub prompt: String,
}

fn non_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("prompt must not be empty"));
    }
    Ok(())
}

/// A prompt that passed validation. The only way to create a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Trim and validate raw submitter text.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let request = SubmitRequest {
            prompt: raw.trim().to_string(),
        };
        request.validate().map_err(|report| {
            report
                .iter()
                .map(|(_, error)| error.message().to_string())
                .next()
                .unwrap_or_else(|| "invalid prompt".to_string())
        })?;
        Ok(Self(request.prompt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Response after submitting a prompt.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Query string for the status lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub job_id: Option<String>,
}

/// Response for querying job status.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result_url: Option<String>,
}

impl From<&ImageJob> for JobStatusResponse {
    fn from(job: &ImageJob) -> Self {
        Self {
            status: job.status,
            result_url: job.result_url.clone(),
        }
    }
}

/// Response of a worker trigger.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub processed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: Uuid,
    pub prompt: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub images: Vec<GalleryImage>,
}

impl GalleryResponse {
    pub fn from_jobs(jobs: Vec<ImageJob>) -> Self {
        let images = jobs
            .into_iter()
            .filter_map(|job| {
                Some(GalleryImage {
                    id: job.id,
                    prompt: job.prompt,
                    image_url: job.result_url?,
                    created_at: job.created_at,
                })
            })
            .collect();
        Self { images }
    }
}
