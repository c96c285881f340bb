//! Client configuration parsed from environment variables.

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "SHOPFRONT_API_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API URL is not an absolute `http`/`https` URL.
    #[error("invalid API URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned() }
    }
}

impl ClientConfig {
    /// Build config from an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when the URL has no http(s) scheme.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { api_url: normalize_api_url(api_url)? })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SHOPFRONT_API_URL`: default `http://localhost:8000`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when the variable is set to a
    /// non-http(s) value.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw),
            _ => Ok(Self::default()),
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
