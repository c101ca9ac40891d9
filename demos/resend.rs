//! Resend Example
//!
//! Sends one email through the dispatcher, bounded by a 10s deadline.
//!
//! Run with: RESEND_TOKEN=re_... RESEND_FROM=... RESEND_TO=... cargo run -p demos --bin resend_demo

use std::sync::Arc;
use std::time::Duration;

use contracts::SendContext;
use dispatcher::Dispatcher;
use messengers::{LogMessenger, ResendMessage, ResendMessenger};
use observability::{LogTarget, ObservabilityConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    observability::init_with_config(
        ObservabilityConfig::default().with_target(LogTarget::Stdout),
    )?;

    let email = ResendMessenger::builder()
        .token(std::env::var("RESEND_TOKEN")?)
        .message(ResendMessage {
            from: std::env::var("RESEND_FROM")?,
            to: vec![std::env::var("RESEND_TO")?],
            cc: vec![],
            subject: "nofy demo".to_string(),
            html: Some("<p>Text Html</p>".to_string()),
            text: None,
        })
        .build()?;

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_messenger(Arc::new(email));
    dispatcher.add_messenger(Arc::new(LogMessenger::new("audit", "demo email sent")));

    let ctx = SendContext::with_timeout(Duration::from_secs(10));
    let report = dispatcher.send_all_detailed(&ctx).await;
    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(()) => tracing::info!(messenger = %outcome.messenger, "Delivered"),
            Err(e) => tracing::error!(messenger = %outcome.messenger, error = %e, "Failed"),
        }
    }

    Ok(report.into_result()?)
}
