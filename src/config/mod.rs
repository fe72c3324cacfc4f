use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the worker.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string. The API server falls back to an
    /// in-memory store without it; the worker requires it.
    #[serde(default)]
    pub database_url: Option<String>,

    /// API key for the image generation service
    pub openai_api_key: String,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Bound on a single render call, in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Wrap prompts in the tiny home render template
    #[serde(default = "default_enrich_prompt")]
    pub enrich_prompt: bool,

    /// Worker sleep between polls when the queue is empty
    #[serde(default = "default_worker_poll_interval_ms")]
    pub worker_poll_interval_ms: u64,

    /// Maximum number of images returned by the gallery
    #[serde(default = "default_gallery_limit")]
    pub gallery_limit: i64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_render_timeout_secs() -> u64 {
    60
}

fn default_enrich_prompt() -> bool {
    true
}

fn default_worker_poll_interval_ms() -> u64 {
    1000
}

fn default_gallery_limit() -> i64 {
    100
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn render_timeout(&self) -> Duration {
        // A zero timeout would fail every job.
        Duration::from_secs(self.render_timeout_secs.max(1))
    }

    pub fn worker_poll_interval(&self) -> Duration {
        Duration::from_millis(self.worker_poll_interval_ms)
    }
}
