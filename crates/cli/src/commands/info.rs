//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{MessengerConfig, MessengerKind, NofyConfig, DEFAULT_TIMEOUT_MS};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    messengers: Vec<MessengerInfo>,
}

/// One messenger; credentials are never included
#[derive(Serialize)]
struct MessengerInfo {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    target: String,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &NofyConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        timeout_ms: config.dispatch.timeout_ms,
        messengers: config.messengers.iter().map(messenger_info).collect(),
    }
}

fn messenger_info(messenger: &MessengerConfig) -> MessengerInfo {
    let (target, timeout_ms, url) = match &messenger.kind {
        MessengerKind::Slack(slack) => (
            format!("#{} ({} blocks)", slack.channel, slack.blocks.len()),
            slack.timeout_ms,
            slack.url.clone(),
        ),
        MessengerKind::Resend(resend) => {
            let mut target = resend.to.join(", ");
            if !resend.cc.is_empty() {
                target.push_str(&format!(" (cc: {})", resend.cc.join(", ")));
            }
            (target, resend.timeout_ms, resend.url.clone())
        }
        MessengerKind::Log(_) => ("tracing".to_string(), DEFAULT_TIMEOUT_MS, None),
    };

    MessengerInfo {
        name: messenger.name.clone(),
        kind: messenger.kind_name().to_string(),
        target,
        timeout_ms,
        url,
    }
}

fn print_config_info(config: &NofyConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                     nofy Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Dispatch");
    println!("   ├─ Version: {:?}", config.version);
    match config.dispatch.timeout_ms {
        Some(timeout) => println!("   └─ Timeout: {} ms", timeout),
        None => println!("   └─ Timeout: none"),
    }

    println!("\n📤 Messengers ({})", config.messengers.len());
    for (i, messenger) in config.messengers.iter().enumerate() {
        let is_last = i == config.messengers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        let info = messenger_info(messenger);

        println!("   {} {} ({})", prefix, info.name, info.kind);
        println!("   {}  ├─ Target: {}", child_prefix, info.target);
        match info.url {
            Some(url) => {
                println!("   {}  ├─ Timeout: {} ms", child_prefix, info.timeout_ms);
                println!("   {}  └─ URL: {}", child_prefix, url);
            }
            None => println!("   {}  └─ Timeout: {} ms", child_prefix, info.timeout_ms),
        }
    }

    println!();
}
