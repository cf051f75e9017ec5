//! Text generation providers.
//!
//! The chat handler talks to a [`TextProvider`] so the Gemini backend can be
//! swapped for a mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error type for provider operations.
///
/// The `Display` text is what clients see in the `error` field of a
/// fallback reply.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Trait for single-shot text generation backends (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate the reply text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;
}
