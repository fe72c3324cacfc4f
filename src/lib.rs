//! Tiny Home AI render service
//!
//! Prompts are queued as image jobs, rendered one per worker invocation by
//! an OpenAI-compatible image API, and polled by clients until they reach
//! `Done` or `Failed`.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
