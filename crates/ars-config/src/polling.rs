//! Polling cadence for active research sessions.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default interval between status fetches, in milliseconds.
const fn default_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Fixed wall-clock spacing between fetches for one session.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub const fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "polling.interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_two_seconds() {
        let config = PollingConfig::default();
        assert_eq!(config.interval(), std::time::Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_rejected() {
        let config = PollingConfig { interval_ms: 0 };
        assert!(config.validate().is_err());
    }
}
