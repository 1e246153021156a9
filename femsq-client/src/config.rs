//! Client configuration

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Origin used when the configured base URL is relative.
pub const FALLBACK_ORIGIN: &str = "http://localhost:8080";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "FEMSQ_API_BASE_URL";

/// Environment variable overriding the default timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "FEMSQ_API_TIMEOUT_MS";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL could not be parsed
    #[error("Invalid API base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, absolute (`http://host:8080/api`) or relative (`/api`)
    pub base_url: String,
    /// Timeout applied when a request does not set its own
    pub default_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            user_agent: format!("femsq-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `FEMSQ_API_BASE_URL` and `FEMSQ_API_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().to_string();
            }
        }

        if let Some(timeout_ms) = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            config.default_timeout = Duration::from_millis(timeout_ms);
        }

        config
    }

    /// Absolute base URL with a trailing slash.
    ///
    /// Relative bases are resolved against [`FALLBACK_ORIGIN`].
    pub fn resolved_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.trim();
        let invalid = |source| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        };

        let mut url = if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw).map_err(invalid)?
        } else {
            let relative = if raw.starts_with('/') {
                raw.to_string()
            } else {
                format!("/{}", raw)
            };
            Url::parse(FALLBACK_ORIGIN)
                .and_then(|origin| origin.join(&relative))
                .map_err(invalid)?
        };

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_base_resolves_against_fallback_origin() {
        let config = ClientConfig::default();
        let url = config.resolved_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_absolute_base_gets_trailing_slash() {
        let config = ClientConfig {
            base_url: "https://femsq.example.com/api".into(),
            ..Default::default()
        };
        let url = config.resolved_base_url().unwrap();
        assert_eq!(url.as_str(), "https://femsq.example.com/api/");
    }

    #[test]
    fn test_base_without_leading_slash() {
        let config = ClientConfig {
            base_url: "api/v1".into(),
            ..Default::default()
        };
        let url = config.resolved_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/");
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ClientConfig::default().default_timeout, Duration::from_secs(15));
    }
}
