//! Startup configuration, read once and validated before any request.

use thiserror::Error;
use url::Url;

pub const API_URL_VAR: &str = "TODO_API_URL";
pub const LOCALE_VAR: &str = "TODO_LOCALE";

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_LOCALE: &str = "en-US";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{var} must use http or https, got {scheme}")]
    UnsupportedScheme { var: &'static str, scheme: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin that API paths are resolved against.
    pub api_url: Url,
    pub locale: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults;
    /// set-but-malformed keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup(API_URL_VAR) {
            Some(raw) => parse_api_url(&raw)?,
            None => Url::parse(DEFAULT_API_URL).map_err(|e| ConfigError::InvalidUrl {
                var: API_URL_VAR,
                reason: e.to_string(),
            })?,
        };

        let locale = lookup(LOCALE_VAR).unwrap_or_else(|| DEFAULT_LOCALE.to_string());
        if locale.trim().is_empty() {
            return Err(ConfigError::Empty { var: LOCALE_VAR });
        }

        Ok(Self { api_url, locale })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Empty { var: API_URL_VAR });
    }
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        var: API_URL_VAR,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            var: API_URL_VAR,
            scheme: other.to_string(),
        }),
    }
}
