//! Gemini provider implementation.
//!
//! One non-streaming `generateContent` call per prompt, with every safety
//! category relaxed to `BLOCK_NONE`: ordinary medical questions trip the
//! default filters.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Harm categories that get an explicit threshold.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const BLOCK_NONE: &str = "BLOCK_NONE";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// `generateContent` URL for the configured model. The key travels as a
    /// query parameter added at send time so this string is safe to log.
    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model.trim_start_matches("models/")
        )
    }

    fn build_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: BLOCK_NONE.to_string(),
                })
                .collect(),
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.timeout)
        } else {
            // The URL carries the API key.
            ProviderError::Network(error_chain(&err.without_url()))
        }
    }

    /// First candidate's first part, which must carry text.
    fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates".to_string()))?;

        let finish_reason = candidate.finish_reason.unwrap_or_default();

        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(if finish_reason.is_empty() {
                    "candidate has no text part".to_string()
                } else {
                    format!("candidate has no text part (finish reason {})", finish_reason)
                })
            })
    }
}

/// `err` followed by each of its sources, joined with `": "`. reqwest keeps
/// the underlying cause (refused connection, DNS failure) out of its own
/// `Display`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = Self::build_request(prompt);
        let url = self.api_url();

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .traced_post(&url)
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.config.timeout)
            } else {
                ProviderError::MalformedResponse(error_chain(&e.without_url()))
            }
        })?;

        Self::extract_text(api_response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn make_provider(server: &MockServer, timeout: Duration) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("test-key".to_string()),
            api_base: server.uri(),
            model: "gemini-1.5-flash".to_string(),
            timeout,
        })
        .expect("client builds")
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn request_relaxes_all_four_safety_categories() {
        let body = serde_json::to_value(GeminiTextProvider::build_request("hi")).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        let settings = body["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        for (setting, category) in settings.iter().zip(SAFETY_CATEGORIES) {
            assert_eq!(setting["category"], category);
            assert_eq!(setting["threshold"], "BLOCK_NONE");
        }
    }

    #[tokio::test]
    async fn test_generate_returns_first_text_part() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "prompt text" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Xin chào")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let reply = provider.generate("prompt text").await.unwrap();

        assert_eq!(reply, "Xin chào");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let err = provider.generate("hi").await.unwrap_err();

        match err {
            ProviderError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_429_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let err = provider.generate("hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let err = provider.generate("hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_blocked_candidate_reports_finish_reason() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let err = provider.generate("hi").await.unwrap_err();

        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_secs(5));
        let err = provider.generate("hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body("too late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let provider = make_provider(&server, Duration::from_millis(200));
        let err = provider.generate("hi").await.unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(_)));
        assert_eq!(err.to_string(), "Request timed out after 200ms");
    }

    #[tokio::test]
    async fn test_network_error_does_not_leak_key() {
        // Nothing listens on port 9 (discard) in the test environment.
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("super-secret-key".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = provider.generate("hi").await.unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ProviderError::Network(_)));
        assert!(!message.contains("super-secret-key"));
        assert!(
            message.to_lowercase().contains("refused"),
            "cause missing from {message:?}"
        );
    }

    #[test]
    fn api_url_strips_models_prefix() {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new("k".to_string()),
            api_base: "https://example.test/v1beta/".to_string(),
            model: "models/gemini-1.5-flash".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(
            provider.api_url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
