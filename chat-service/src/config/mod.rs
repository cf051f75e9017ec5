use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Gemini REST endpoint, without the `/models/...` suffix.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub gemini: GeminiSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// `None` puts the service in fallback-only mode.
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Directory served at `/`.
    pub public_dir: String,
    pub log_level: String,
    /// OTLP collector; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            public_dir: DEFAULT_PUBLIC_DIR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            otlp_endpoint: None,
        }
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let timeout_secs = get_env(
            "GEMINI_TIMEOUT_SECS",
            &DEFAULT_GEMINI_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("GEMINI_TIMEOUT_SECS is not a number: {}", e))
        })?;

        Ok(ChatConfig {
            common,
            google: GoogleConfig {
                api_key: get_optional_env("GOOGLE_API_KEY").map(Secret::new),
            },
            gemini: GeminiSettings {
                api_base: get_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                model: get_env("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                timeout: Duration::from_secs(timeout_secs),
            },
            server: ServerSettings {
                public_dir: get_env("PUBLIC_DIR", DEFAULT_PUBLIC_DIR),
                log_level: get_env("LOG_LEVEL", DEFAULT_LOG_LEVEL),
                otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            },
        })
    }

    /// Settings for an instance with no API key, used by tests and local runs.
    pub fn fallback_only() -> Self {
        ChatConfig {
            common: core_config::Config::default(),
            google: GoogleConfig::default(),
            gemini: GeminiSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
