use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Gemini,
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Gemini => "gemini",
            ReplySource::Fallback => "fallback",
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Missing or `null` reads as empty; numbers and booleans are taken as
    /// their text form. Arrays and objects are not stringified: they fail
    /// deserialization, which the handler turns into a 400.
    #[serde(default, deserialize_with = "message_as_text")]
    pub message: String,
}

fn message_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => {
            Err(serde::de::Error::custom("message must be a string"))
        }
    }
}

/// Body of a successful `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub source: ReplySource,
    /// Upstream failure detail; only on fallback replies caused by an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
