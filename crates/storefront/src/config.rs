//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the storefront REST backend
//!
//! ## Optional
//! - `BAZAAR_STORAGE_PATH` - Client storage file holding the auth token
//!   (default: `.bazaar/storage.json`)
//! - `BAZAAR_LOGIN_PATH` - Where a forced logout redirects to (default: `/`)
//! - `BAZAAR_HTTP_TIMEOUT_SECS` - Request timeout; unset means the HTTP
//!   client's default (no timeout)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".bazaar/storage.json";
const DEFAULT_LOGIN_PATH: &str = "/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST backend (always ends with `/`)
    pub api_url: Url,
    /// Path of the persistent client storage file
    pub storage_path: PathBuf,
    /// Redirect target after a forced logout
    pub login_path: String,
    /// Optional per-request timeout
    pub http_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("BAZAAR_API_URL")?)?;
        let storage_path =
            PathBuf::from(get_env_or_default("BAZAAR_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let login_path = get_env_or_default("BAZAAR_LOGIN_PATH", DEFAULT_LOGIN_PATH);
        let http_timeout = get_optional_env("BAZAAR_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            api_url,
            storage_path,
            login_path,
            http_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Build a configuration for a backend URL with every optional setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            http_timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend base URL, normalizing it to end with `/` so relative
/// endpoint paths join beneath it instead of replacing its last segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_API_URL".to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "BAZAAR_API_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            "BAZAAR_HTTP_TIMEOUT_SECS".to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "BAZAAR_HTTP_TIMEOUT_SECS".to_string(),
            e.to_string(),
        )),
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
