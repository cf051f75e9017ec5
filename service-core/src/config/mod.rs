use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Listener port used when neither `PORT` nor `APP__PORT` is set.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load the common settings.
    ///
    /// Sources, lowest to highest precedence: an optional `configuration`
    /// file, `APP__*` environment variables, then the bare `PORT` variable
    /// that hosting platforms set.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}
