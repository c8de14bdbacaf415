//! # ars-config
//!
//! Layered configuration loading for the `ars` client using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ARS_*` prefix, `__` as separator)
//! 2. Project-level `.ars/config.toml`
//! 3. User-level `~/.config/ars/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ARS_BACKEND__BASE_URL` -> `backend.base_url`,
//! `ARS_POLLING__INTERVAL_MS` -> `polling.interval_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use ars_config::ArsConfig;
//!
//! let config = ArsConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.endpoint_root());
//! ```

mod backend;
mod error;
mod general;
mod polling;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use polling::PollingConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
const LOCAL_CONFIG_PATH: &str = ".ars/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArsConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ArsConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests and the CLI can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ARS_").split("__"))
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.polling.validate()
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ars").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ArsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.interval_ms, 2000);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config = ArsConfig::from_figment(&ArsConfig::figment())
                .expect("should extract defaults");
            assert_eq!(config.polling.interval_ms, 2000);
            assert_eq!(config.general.report_dir, ".");
            Ok(())
        });
    }
}
