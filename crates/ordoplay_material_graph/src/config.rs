// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generator configuration.
//!
//! Settings that apply to a whole generation pass rather than to a single
//! node. Stored as RON next to the material documents.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Floating point precision keyword used for every emitted vector type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precision {
    /// `half`
    #[default]
    Half,
    /// `float`
    Float,
    /// `fixed`
    Fixed,
}

impl Precision {
    /// Shading-language keyword
    pub fn token(self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::Float => "float",
            Self::Fixed => "fixed",
        }
    }
}

/// Configuration for a generation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Format version
    pub version: u32,
    /// Name written into the `Shader "..."` header
    pub shader_name: String,
    /// Precision for emitted vector types
    pub precision: Precision,
    /// Largest graph a pass will traverse
    pub max_nodes: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            shader_name: "OrdoPlay/Material".to_string(),
            precision: Precision::Half,
            max_nodes: 4096,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = ron::from_str(text)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save to a configuration file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Error when loading or saving a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Configuration version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.precision, Precision::Half);
    }

    #[test]
    fn test_serialization() {
        let config = GeneratorConfig {
            precision: Precision::Float,
            max_nodes: 12,
            ..GeneratorConfig::default()
        };
        let text = config.to_ron().unwrap();
        let loaded = GeneratorConfig::from_ron(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = GeneratorConfig::from_ron("(precision: Fixed)").unwrap();
        assert_eq!(loaded.precision, Precision::Fixed);
        assert_eq!(loaded.max_nodes, GeneratorConfig::default().max_nodes);
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = GeneratorConfig::from_ron("(version: 99)");
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
