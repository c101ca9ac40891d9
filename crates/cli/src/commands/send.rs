//! `send` command implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{MessengerConfig, NofyConfig, SendContext};
use dispatcher::{create_dispatcher, DispatchReport};
use observability::SendStatsAggregator;
use requester::HttpRequester;
use tracing::{info, warn};

use crate::cli::SendArgs;
use crate::error::CliError;

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let selected = select_messengers(&config, &args.only)?;
    if selected.is_empty() {
        warn!("No messengers configured, nothing to send");
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let dispatcher = create_dispatcher(&selected, Arc::new(HttpRequester::new()))
        .context("Failed to create messengers")?;

    let ctx = match args.timeout_ms.or(config.dispatch.timeout_ms) {
        Some(ms) => SendContext::with_timeout(Duration::from_millis(ms)),
        None => SendContext::background(),
    };

    info!(
        messengers = dispatcher.len(),
        timeout_ms = ?ctx.remaining().map(|d| d.as_millis()),
        "Sending notification"
    );

    // Ctrl+C / SIGTERM cancel in-flight sends instead of killing the process
    let canceller = ctx.clone();
    let signal_watcher = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, cancelling sends...");
        canceller.cancel();
    });

    let started = Instant::now();
    let report = dispatcher.send_all_detailed(&ctx).await;
    signal_watcher.abort();

    print_report(&report, started.elapsed());

    let mut stats = SendStatsAggregator::new();
    stats.record_dispatch();
    for outcome in report.outcomes() {
        stats.update(
            &outcome.messenger,
            outcome.is_success(),
            outcome.elapsed.as_secs_f64() * 1000.0,
        );
    }
    info!(summary = %stats.summary(), "Send finished");

    let (failed, total) = (report.failure_count(), report.len());
    report
        .into_result()
        .context(CliError::send_failed(failed, total))
}

/// Apply `--only` filters, keeping configuration order
fn select_messengers(config: &NofyConfig, only: &[String]) -> Result<Vec<MessengerConfig>> {
    if only.is_empty() {
        return Ok(config.messengers.clone());
    }

    let available: Vec<&str> = config.messengers.iter().map(|m| m.name.as_str()).collect();
    if let Some(unknown) = only.iter().find(|name| !available.contains(&name.as_str())) {
        return Err(CliError::unknown_messenger(unknown, &available).into());
    }

    Ok(config
        .messengers
        .iter()
        .filter(|m| only.contains(&m.name))
        .cloned()
        .collect())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_report(report: &DispatchReport, elapsed: Duration) {
    let mut outcomes: Vec<_> = report.outcomes().iter().collect();
    outcomes.sort_by_key(|o| o.index);

    println!("\n=== Send Report ===\n");
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => println!(
                "  ✓ {} ({} ms)",
                outcome.messenger,
                outcome.elapsed.as_millis()
            ),
            Err(e) => println!(
                "  ✗ {} ({} ms): {}",
                outcome.messenger,
                outcome.elapsed.as_millis(),
                e
            ),
        }
    }
    println!(
        "\n  {} sent, {} failed in {} ms\n",
        report.len() - report.failure_count(),
        report.failure_count(),
        elapsed.as_millis()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{LogConfig, MessengerKind};

    fn config_with(names: &[&str]) -> NofyConfig {
        NofyConfig {
            messengers: names
                .iter()
                .map(|name| MessengerConfig {
                    name: name.to_string(),
                    kind: MessengerKind::Log(LogConfig {
                        message: "hi".to_string(),
                    }),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_all_without_filter() {
        let config = config_with(&["a", "b"]);
        assert_eq!(select_messengers(&config, &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_select_keeps_config_order() {
        let config = config_with(&["a", "b", "c"]);
        let only = vec!["c".to_string(), "a".to_string()];
        let names: Vec<_> = select_messengers(&config, &only)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn test_select_unknown_name() {
        let config = config_with(&["a", "b"]);
        let err = select_messengers(&config, &["z".to_string()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown messenger 'z' (configured: a, b)"
        );
    }

    #[tokio::test]
    async fn test_send_log_messengers_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nofy.toml");
        std::fs::write(
            &path,
            r#"
[[messengers]]
name = "audit"
type = "log"
message = "deploy finished"
"#,
        )
        .unwrap();

        let args = SendArgs {
            config: path,
            timeout_ms: Some(1000),
            only: vec![],
            metrics_port: 0,
        };
        assert!(run_send(&args).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_missing_config() {
        let args = SendArgs {
            config: "/nonexistent/nofy.toml".into(),
            timeout_ms: None,
            only: vec![],
            metrics_port: 0,
        };
        let err = run_send(&args).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "got: {err}");
    }
}
