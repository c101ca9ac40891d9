//! # Config Loader
//!
//! Configuration loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate messenger definitions
//! - Produce a `NofyConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("nofy.toml")).unwrap();
//! println!("Messengers: {}", config.messengers.len());
//! ```

mod parser;
mod validator;

pub use contracts::NofyConfig;
pub use parser::ConfigFormat;

use contracts::NofyError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is detected from the extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<NofyConfig, NofyError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<NofyConfig, NofyError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize to a TOML string
    pub fn to_toml(config: &NofyConfig) -> Result<String, NofyError> {
        toml::to_string_pretty(config)
            .map_err(|e| NofyError::serialization(format!("TOML serialize error: {e}")))
    }

    /// Serialize to a JSON string
    pub fn to_json(config: &NofyConfig) -> Result<String, NofyError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| NofyError::serialization(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, NofyError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            NofyError::config("path", "cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            NofyError::config("path", format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, NofyError> {
        std::fs::read_to_string(path).map_err(|e| {
            NofyError::config(
                "path",
                format!("failed to read {}: {e}", path.display()),
            )
        })
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<NofyConfig, NofyError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
version = "v1"

[dispatch]
timeout_ms = 10000

[[messengers]]
name = "ops-slack"
type = "slack"
token = "xoxb-1"
channel = "C0123"
blocks = [ { type = "section", text = { type = "mrkdwn", text = "deploy done" } } ]

[[messengers]]
name = "audit"
type = "log"
message = "deploy done"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.messengers.len(), 2);
        assert_eq!(config.messengers[0].name, "ops-slack");
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.messengers.len(), config2.messengers.len());
        assert_eq!(config.messengers[1].name, config2.messengers[1].name);
        assert_eq!(config2.dispatch.timeout_ms, Some(10_000));
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config2.messengers[0].kind_name(), "slack");
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[messengers]]
name = "audit"
type = "log"
message = "one"

[[messengers]]
name = "audit"
type = "log"
message = "two"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.messengers.len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported config format: .yaml");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_path(Path::new("/nonexistent/nofy.toml")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"), "got: {err}");
    }
}
