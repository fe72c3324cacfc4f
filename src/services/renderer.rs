use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// External capability that turns a prompt into a hosted image.
#[async_trait]
pub trait ImageRenderer: Send + Sync {
    /// Render one image and return the absolute URL it is served from.
    async fn render(&self, prompt: &str) -> Result<Url, RenderError>;
}

/// Client for an OpenAI-compatible `images/generations` endpoint.
pub struct OpenAiImageClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    size: String,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    data: Option<Vec<GeneratedImage>>,
    error: Option<ApiErrorObject>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorObject {
    message: Option<String>,
    code: Option<String>,
}

impl OpenAiImageClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        size: &str,
        timeout: Duration,
    ) -> Result<Self, RenderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RenderError::Http)?;

        Ok(Self {
            http,
            endpoint: format!("{}/v1/images/generations", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            size: size.to_string(),
        })
    }
}

#[async_trait]
impl ImageRenderer for OpenAiImageClient {
    async fn render(&self, prompt: &str) -> Result<Url, RenderError> {
        let request = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(RenderError::Http)?;

        let status = response.status();
        // Read as text first: error pages from proxies are frequently HTML.
        let body = response.text().await.map_err(RenderError::Http)?;

        parse_generation_response(status, &body)
    }
}

/// Decide whether an image API response is a usable result.
pub fn parse_generation_response(status: StatusCode, body: &str) -> Result<Url, RenderError> {
    let parsed: Result<GenerationResponse, _> = serde_json::from_str(body);

    if let Ok(GenerationResponse {
        error: Some(error), ..
    }) = &parsed
    {
        return Err(RenderError::Api {
            message: error
                .message
                .clone()
                .unwrap_or_else(|| "Error from image service".to_string()),
            code: error.code.clone().unwrap_or_else(|| "unknown_error".to_string()),
        });
    }

    if !status.is_success() {
        return Err(RenderError::Status(status));
    }

    let parsed = parsed.map_err(RenderError::Parse)?;
    let raw = parsed
        .data
        .and_then(|images| images.into_iter().next())
        .and_then(|image| image.url)
        .ok_or(RenderError::MissingUrl)?;

    let url = Url::parse(&raw).map_err(|_| RenderError::InvalidUrl(raw.clone()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(RenderError::InvalidUrl(raw));
    }

    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image service returned status {0}")]
    Status(StatusCode),

    #[error("Failed to parse image service response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Image service error ({code}): {message}")]
    Api { message: String, code: String },

    #[error("Image service response did not contain an image URL")]
    MissingUrl,

    #[error("Image service returned an unusable URL: {0}")]
    InvalidUrl(String),

    #[error("Image service did not respond within {0:?}")]
    Timeout(Duration),
}
