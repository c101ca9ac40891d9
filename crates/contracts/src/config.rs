//! NofyConfig - Config Loader output
//!
//! Describes the messengers to build and how a dispatch is bounded.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default per-request timeout for HTTP backends
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NofyConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Fan-out settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Messenger definitions, one per backend target
    #[serde(default)]
    #[validate(nested)]
    pub messengers: Vec<MessengerConfig>,
}

/// Fan-out settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Overall deadline applied to the send context (None = no deadline)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// One messenger definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessengerConfig {
    /// Unique name (used for logging/metrics/CLI filtering)
    #[validate(length(min = 1, message = "messenger name cannot be empty"))]
    pub name: String,

    /// Backend-specific settings, selected by `type`
    #[serde(flatten)]
    pub kind: MessengerKind,
}

impl MessengerConfig {
    /// Short backend label
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MessengerKind::Slack(_) => "slack",
            MessengerKind::Resend(_) => "resend",
            MessengerKind::Log(_) => "log",
        }
    }
}

/// Supported backends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessengerKind {
    Slack(SlackConfig),
    Resend(ResendConfig),
    Log(LogConfig),
}

/// Slack chat.postMessage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Channel ID
    #[serde(default)]
    pub channel: String,

    /// Block Kit blocks, sent verbatim
    #[serde(default)]
    pub blocks: Vec<serde_json::Value>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Resend email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: Vec<String>,

    #[serde(default)]
    pub cc: Vec<String>,

    #[serde(default)]
    pub subject: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Log-only messenger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub message: String,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
