use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub api_base_url: String,
    pub identity_base_url: String,
    pub identity_api_key: String,
    /// Empty disables the chat relay.
    pub chat_webhook_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("PORT", "8080")?,
            data_path: try_load("APP_DATA_PATH", "data/state.json")?,
            api_base_url: trim_url(try_load("RIPPLE_API_BASE_URL", "http://127.0.0.1:5000")?),
            identity_base_url: trim_url(try_load(
                "RIPPLE_IDENTITY_BASE_URL",
                "https://identitytoolkit.googleapis.com/v1",
            )?),
            identity_api_key: try_load("RIPPLE_IDENTITY_API_KEY", "")?,
            chat_webhook_url: try_load("RIPPLE_CHAT_WEBHOOK_URL", "")?,
            http_timeout: Duration::from_secs(try_load("RIPPLE_HTTP_TIMEOUT_SECS", "10")?),
        })
    }

    pub fn chat_enabled(&self) -> bool {
        !self.chat_webhook_url.is_empty()
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default:?}");
        default.to_string()
    });

    raw.trim().parse().map_err(|err: T::Err| {
        warn!("invalid {key} value: {err}");
        ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }
    })
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
