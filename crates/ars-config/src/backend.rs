//! Research backend connection settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default backend origin when running next to the service.
fn default_base_url() -> String {
    String::from("http://localhost:8000")
}

fn default_user_agent() -> String {
    String::from("ars/0.1")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend origin (scheme + host + optional port).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix in front of every endpoint. Set to `/api` when talking
    /// through the reverse proxy that forwards `/api/*` to the backend.
    #[serde(default)]
    pub api_prefix: String,

    /// Per-request timeout in seconds. `0` disables the timeout.
    #[serde(default)]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: String::new(),
            request_timeout_secs: 0,
            user_agent: default_user_agent(),
        }
    }
}

impl BackendConfig {
    /// Base URL joined with the API prefix, without a trailing slash.
    #[must_use]
    pub fn endpoint_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    /// The request timeout, if one is configured.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<std::time::Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Check that the base URL is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparseable or non-http URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "backend.base_url".into(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url".into(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.api_prefix.is_empty());
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_root_joins_prefix() {
        let config = BackendConfig {
            base_url: "http://frontend:3000/".into(),
            api_prefix: "/api/".into(),
            ..Default::default()
        };
        assert_eq!(config.endpoint_root(), "http://frontend:3000/api");
    }

    #[test]
    fn endpoint_root_without_prefix() {
        assert_eq!(
            BackendConfig::default().endpoint_root(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let config = BackendConfig {
            base_url: "ftp://backend".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_relative_url() {
        let config = BackendConfig {
            base_url: "/api".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeout_when_set() {
        let config = BackendConfig {
            request_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(
            config.request_timeout(),
            Some(std::time::Duration::from_secs(30))
        );
    }
}
