//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MEDICART_API_BASE_URL` - API origin plus `/api` prefix (default: `http://localhost:8000/api`)
//! - `MEDICART_STORE_PATH` - JSON file backing the local store (default: `medicart-store.json`)
//! - `MEDICART_CATALOG_TTL_SECS` - How long product listings stay cached (default: 300)
//! - `MEDICART_AI_CHAT` - `on` to ask the remote assistant, `off` for canned replies only (default: on)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_STORE_PATH: &str = "medicart-store.json";
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash (e.g. `http://localhost:8000/api`)
    pub api_base_url: Url,
    /// Where the local store keeps its JSON file
    pub store_path: PathBuf,
    /// Lifetime of cached product listings
    pub catalog_ttl: Duration,
    /// Whether the chat assistant calls the remote AI endpoint
    pub ai_chat_enabled: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            ai_chat_enabled: true,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "MEDICART_API_BASE_URL",
            &get_env_or_default("MEDICART_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let store_path = PathBuf::from(get_env_or_default("MEDICART_STORE_PATH", DEFAULT_STORE_PATH));
        let catalog_ttl = get_env_or_default(
            "MEDICART_CATALOG_TTL_SECS",
            &DEFAULT_CATALOG_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("MEDICART_CATALOG_TTL_SECS".to_string(), e.to_string())
        })?;
        let ai_chat_enabled = parse_switch("MEDICART_AI_CHAT", &get_env_or_default("MEDICART_AI_CHAT", "on"))?;

        Ok(Self {
            api_base_url,
            store_path,
            catalog_ttl,
            ai_chat_enabled,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at a specific API, with defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn with_api_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", base_url)?,
            ..Self::default()
        })
    }

    /// Full URL for an API path such as `/auth/login`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Parse and validate an API base URL.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL must have a host".to_string(),
        ));
    }
    Ok(url)
}

/// Parse an on/off switch.
fn parse_switch(var_name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected on/off, got '{other}'"),
        )),
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
