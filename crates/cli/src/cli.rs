//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// nofy - send one notification to every configured messenger
#[derive(Parser, Debug)]
#[command(
    name = "nofy",
    author,
    version,
    about = "Notification fan-out to Slack, email and more",
    long_about = "Sends one notification concurrently to every messenger defined in a \n\
                  configuration file and reports the outcome of each send."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "NOFY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "NOFY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup for the global flags: `-q` pins `warn`, `-v`/`-vv`
    /// raise the default used when `RUST_LOG` is unset
    pub fn observability_config(&self) -> ObservabilityConfig {
        let config = ObservabilityConfig::default().with_format(self.log_format.into());
        if self.quiet {
            return config.with_fixed_level("warn");
        }
        match self.verbose {
            0 => config.with_level("info"),
            1 => config.with_level("debug"),
            _ => config.with_level("trace"),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send the configured notification to all messengers
    Send(SendArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "nofy.toml", env = "NOFY_CONFIG")]
    pub config: PathBuf,

    /// Overall deadline in milliseconds, overriding `dispatch.timeout_ms`
    #[arg(long, env = "NOFY_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Only send to the named messenger (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "NOFY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "nofy.toml", env = "NOFY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "nofy.toml", env = "NOFY_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
