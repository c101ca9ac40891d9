//! Config parsing
//!
//! TOML (primary) and JSON.

use contracts::{NofyConfig, NofyError};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<NofyConfig, NofyError> {
    toml::from_str(content)
        .map_err(|e| NofyError::config("config", format!("TOML parse error: {e}")))
}

pub fn parse_json(content: &str) -> Result<NofyConfig, NofyError> {
    serde_json::from_str(content)
        .map_err(|e| NofyError::config("config", format!("JSON parse error: {e}")))
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<NofyConfig, NofyError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
