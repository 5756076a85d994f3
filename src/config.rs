//! Library configuration
//!
//! Loaded from TOML or built in code, then handed to
//! [`crate::AmbitDiscovery`]. Every field has a default, so an empty file is
//! a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AmbitError, Result};

/// Software version tag sent with the device-info probe
pub const DEFAULT_VERSION_TAG: [u8; 4] = [0x02, 0x00, 0x2d, 0x00];

/// Settings for enumeration and session handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version tag identifying the requesting software in DEVICE_INFO
    pub version_tag: [u8; 4],
    /// Put session handles in non-blocking mode after opening
    pub nonblocking: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_tag: DEFAULT_VERSION_TAG,
            nonblocking: true,
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AmbitError::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AmbitError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AmbitError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg = Config::from_toml_str("version_tag = [2, 0, 46, 0]").unwrap();
        assert_eq!(cfg.version_tag, [2, 0, 46, 0]);
        assert!(cfg.nonblocking);
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let err = Config::from_toml_str("version_tag = [2, 0, 300, 0]").unwrap_err();
        assert!(matches!(err, AmbitError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = Config {
            version_tag: [1, 2, 3, 4],
            nonblocking: false,
        };
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load("/nonexistent/libambit.toml").unwrap_err();
        assert!(matches!(err, AmbitError::Config(_)));
    }
}
