//! Relay between the chat endpoint and the text provider.
//!
//! Every non-empty message gets a reply: Gemini's when it is configured and
//! answers, a canned one from [`fallback::classify`] otherwise.

use crate::config::ChatConfig;
use crate::models::{ChatResponse, ReplySource};
use crate::services::fallback;
use crate::services::metrics::record_reply;
use crate::services::prompts::render_chat_prompt;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use service_core::error::AppError;
use std::sync::Arc;

pub const EMPTY_MESSAGE_ERROR: &str = "Empty message";

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Gemini answered.
    Upstream { reply: String },
    /// Canned reply. `error` is set when Gemini was called and failed, and
    /// unset when no API key is configured.
    Fallback {
        reply: String,
        error: Option<String>,
    },
}

impl ChatOutcome {
    pub fn source(&self) -> ReplySource {
        match self {
            ChatOutcome::Upstream { .. } => ReplySource::Gemini,
            ChatOutcome::Fallback { .. } => ReplySource::Fallback,
        }
    }

    pub fn reply(&self) -> &str {
        match self {
            ChatOutcome::Upstream { reply } | ChatOutcome::Fallback { reply, .. } => reply,
        }
    }
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        let source = outcome.source();
        match outcome {
            ChatOutcome::Upstream { reply } => ChatResponse {
                reply,
                source,
                error: None,
            },
            ChatOutcome::Fallback { reply, error } => ChatResponse {
                reply,
                source,
                error,
            },
        }
    }
}

pub struct ChatService {
    provider: Option<Arc<dyn TextProvider>>,
}

impl ChatService {
    /// `None` runs in fallback-only mode.
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self { provider }
    }

    /// Build the Gemini-backed service when an API key is configured.
    pub fn from_config(config: &ChatConfig) -> Result<Self, AppError> {
        let Some(api_key) = config.google.api_key.clone() else {
            return Ok(Self::new(None));
        };

        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key,
            api_base: config.gemini.api_base.clone(),
            model: config.gemini.model.clone(),
            timeout: config.gemini.timeout,
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        Ok(Self::new(Some(Arc::new(provider))))
    }

    /// Where replies come from when nothing fails.
    pub fn mode(&self) -> ReplySource {
        if self.provider.is_some() {
            ReplySource::Gemini
        } else {
            ReplySource::Fallback
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.model())
    }

    /// Answer one message.
    ///
    /// The only error is a blank message; provider failures become fallback
    /// replies carrying the failure text.
    #[tracing::instrument(skip_all, fields(message_len = message.len()))]
    pub async fn handle(&self, message: &str) -> Result<ChatOutcome, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::bad_request(EMPTY_MESSAGE_ERROR));
        }

        let outcome = match &self.provider {
            None => ChatOutcome::Fallback {
                reply: fallback::classify(message).to_string(),
                error: None,
            },
            Some(provider) => match provider.generate(&render_chat_prompt(message)).await {
                Ok(reply) => ChatOutcome::Upstream { reply },
                Err(e) => {
                    tracing::error!(
                        model = provider.model(),
                        error = %e,
                        "Gemini request failed, answering with fallback reply"
                    );
                    ChatOutcome::Fallback {
                        reply: fallback::classify(message).to_string(),
                        error: Some(e.to_string()),
                    }
                }
            },
        };

        record_reply(outcome.source());
        tracing::debug!(source = outcome.source().as_str(), "Chat reply ready");

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;

    fn with_mock(mock: MockTextProvider) -> (ChatService, Arc<MockTextProvider>) {
        let mock = Arc::new(mock);
        let service = ChatService::new(Some(mock.clone() as Arc<dyn TextProvider>));
        (service, mock)
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let (service, mock) = with_mock(MockTextProvider::replying("unused"));

        for message in ["", "   ", "\n\t"] {
            let err = service.handle(message).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn without_provider_replies_from_fallback_without_error() {
        let service = ChatService::new(None);

        let outcome = service.handle("Đặt lịch khám").await.unwrap();

        assert_eq!(
            outcome,
            ChatOutcome::Fallback {
                reply: fallback::BOOKING_REPLY.to_string(),
                error: None,
            }
        );
        assert_eq!(service.mode(), ReplySource::Fallback);
    }

    #[tokio::test]
    async fn upstream_text_is_returned_verbatim() {
        let (service, _) = with_mock(MockTextProvider::replying("Xin chào"));

        let outcome = service.handle("hello").await.unwrap();

        assert_eq!(
            ChatResponse::from(outcome),
            ChatResponse {
                reply: "Xin chào".to_string(),
                source: ReplySource::Gemini,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_with_error() {
        let (service, mock) = with_mock(MockTextProvider::failing("connection reset"));

        let outcome = service.handle("  Chi phí khám?  ").await.unwrap();

        match outcome {
            ChatOutcome::Fallback { reply, error } => {
                assert_eq!(reply, fallback::classify("Chi phí khám?"));
                let error = error.expect("error detail");
                assert!(error.contains("connection reset"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn prompt_carries_trimmed_message() {
        let (service, mock) = with_mock(MockTextProvider::replying("ok"));

        service.handle("  Khám mắt ở đâu?  ").await.unwrap();

        let prompt = mock.last_prompt().expect("prompt recorded");
        assert!(prompt.contains("\"Khám mắt ở đâu?\""));
    }

    #[test]
    fn from_config_without_key_is_fallback_only() {
        let service = ChatService::from_config(&ChatConfig::fallback_only()).unwrap();
        assert_eq!(service.mode(), ReplySource::Fallback);
        assert_eq!(service.model(), None);
    }
}
