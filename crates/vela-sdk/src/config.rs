//! Codec configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::SdkError;

/// Decoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Reject out-of-range integers, non-canonical bools, dirty padding
    /// and invalid UTF-8 instead of truncating or replacing them
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Read a top-level `string`/`bytes` from its head word when the offset
    /// is unusable (tokens returning `bytes32` names)
    #[serde(default)]
    pub bytes32_string_fallback: bool,
    /// Upper bound on decoded array lengths
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
}

fn default_strict() -> bool {
    true
}

fn default_max_array_len() -> usize {
    1 << 20
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            bytes32_string_fallback: false,
            max_array_len: default_max_array_len(),
        }
    }
}

impl CodecConfig {
    /// Parse from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, SdkError> {
        toml::from_str(content).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, SdkError> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}
