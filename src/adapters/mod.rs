//! Adapter interfaces for external AI services.
//!
//! Adapters provide a unified seam for the chat models that review
//! captions and select hashtags, plus the Dify client that generates the
//! captions themselves.

pub mod dify;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use dify::{CaptionInputs, DifyClient, GeneratedCaption};
pub use openai::OpenAiClient;

/// Errors from external service adapters.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required configuration (key, endpoint) is missing.
    #[error("{service} configuration incomplete: {detail}")]
    Config {
        service: &'static str,
        detail: String,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned status {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response body was not in the expected shape.
    #[error("{service} response was not in the expected shape: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },

    /// A local file for upload could not be read.
    #[error("cannot read {path}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure.
    #[error("network error talking to {service}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// A chat model that answers with a single JSON object.
///
/// Both the compliance reviewer and the hashtag selector speak this
/// interface, so tests can substitute a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable model name (used in logs and history records).
    fn name(&self) -> &str;

    /// Send a system + user message pair, expecting a JSON object back.
    async fn complete_json(&self, system: &str, user: &str) -> Result<String, ServiceError>;
}
