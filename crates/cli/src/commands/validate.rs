//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{MessengerKind, NofyConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    messenger_count: usize,
    slack_count: usize,
    resend_count: usize,
    log_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::config_validation(result.error.unwrap_or_default()).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let count = |kind: &str| {
                config
                    .messengers
                    .iter()
                    .filter(|m| m.kind_name() == kind)
                    .count()
            };

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    messenger_count: config.messengers.len(),
                    slack_count: count("slack"),
                    resend_count: count("resend"),
                    log_count: count("log"),
                    timeout_ms: config.dispatch.timeout_ms,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &NofyConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.messengers.is_empty() {
        warnings.push("No messengers configured - send will do nothing".to_string());
    }

    if config.dispatch.timeout_ms.is_none() {
        warnings.push(
            "dispatch.timeout_ms not set - sends are bounded only by per-messenger timeouts"
                .to_string(),
        );
    }

    for messenger in &config.messengers {
        match &messenger.kind {
            MessengerKind::Slack(slack) if slack.url.is_some() => warnings.push(format!(
                "Messenger '{}' overrides the Slack API URL",
                messenger.name
            )),
            MessengerKind::Resend(resend) if resend.html.is_none() && resend.text.is_none() => {
                warnings.push(format!(
                    "Messenger '{}' has neither html nor text body",
                    messenger.name
                ))
            }
            _ => {}
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Messengers: {}", summary.messenger_count);
            println!("    Slack: {}", summary.slack_count);
            println!("    Resend: {}", summary.resend_count);
            println!("    Log: {}", summary.log_count);
            if let Some(timeout) = summary.timeout_ms {
                println!("  Timeout: {} ms", timeout);
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_for(content: &str) -> (tempfile::TempDir, ValidateArgs) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nofy.toml");
        std::fs::write(&path, content).unwrap();
        (
            dir,
            ValidateArgs {
                config: path,
                json: true,
            },
        )
    }

    #[test]
    fn test_valid_config_summary() {
        let (_dir, args) = args_for(
            r#"
[[messengers]]
name = "mail"
type = "resend"
token = "re_1"
from = "bot@example.com"
to = ["ops@example.com"]
subject = "hi"

[[messengers]]
name = "audit"
type = "log"
message = "hi"
"#,
        );
        let result = validate_config(&args);
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.messenger_count, 2);
        assert_eq!(summary.resend_count, 1);
        assert_eq!(summary.log_count, 1);

        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("neither html nor text")));
        assert!(warnings.iter().any(|w| w.contains("dispatch.timeout_ms")));
    }

    #[test]
    fn test_duplicate_names_are_invalid() {
        let (_dir, args) = args_for(
            r#"
[[messengers]]
name = "audit"
type = "log"
message = "a"

[[messengers]]
name = "audit"
type = "log"
message = "b"
"#,
        );
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("duplicate"));
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: PathBuf::from("/nonexistent/nofy.toml"),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().starts_with("File not found"));
    }
}
