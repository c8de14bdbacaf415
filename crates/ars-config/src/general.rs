//! General application configuration.

use ars_core::entities::Customization;
use ars_core::enums::{Depth, Tone};
use serde::{Deserialize, Serialize};

fn default_report_dir() -> String {
    String::from(".")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Depth used when a command does not pass `--depth`.
    #[serde(default)]
    pub default_depth: Depth,

    /// Tone used when a command does not pass `--tone`.
    #[serde(default)]
    pub default_tone: Tone,

    /// Directory downloaded HTML reports are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_depth: Depth::default(),
            default_tone: Tone::default(),
            report_dir: default_report_dir(),
        }
    }
}

impl GeneralConfig {
    #[must_use]
    pub const fn default_customization(&self) -> Customization {
        Customization::new(self.default_depth, self.default_tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_depth, Depth::Comprehensive);
        assert_eq!(config.default_tone, Tone::Professional);
        assert_eq!(config.report_dir, ".");
        assert_eq!(config.default_customization(), Customization::default());
    }
}
