//! Process-wide client configuration.
//!
//! Read once from the environment:
//! - `PORTAL_ORIGIN`: origin hosting the chat endpoint (default
//!   `http://localhost:5000`).
//! - `PORTAL_API_BASE_URL`: prefix of the user endpoints (default
//!   `{origin}/api/v1`).
//! - `PORTAL_SESSION_COOKIE`: optional session cookie, e.g. `session=abc`.

use std::env;

use reqwest::Url;

pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid http(s) URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub origin: String,
    pub api_base_url: String,
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let origin = read("PORTAL_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let origin = validate_url("PORTAL_ORIGIN", &origin)?;

        let api_base_url = match read("PORTAL_API_BASE_URL") {
            Some(url) => validate_url("PORTAL_API_BASE_URL", &url)?,
            None => format!("{origin}/api/v1"),
        };
        let session_cookie = read("PORTAL_SESSION_COOKIE");

        tracing::info!(%origin, %api_base_url, "portal client configuration loaded");
        tracing::debug!(session_cookie = session_cookie.is_some(), "session cookie configured");

        Ok(Self {
            origin,
            api_base_url,
            session_cookie,
        })
    }
}

/// Check that `value` is an http(s) URL and return it without trailing
/// slashes.
fn validate_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(value.trim_end_matches('/').to_string())
}
