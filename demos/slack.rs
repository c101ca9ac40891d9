//! Slack Example
//!
//! Sends one Block Kit message through the dispatcher.
//!
//! Run with: SLACK_TOKEN=xoxb-... SLACK_CHANNEL=C0123 cargo run -p demos --bin slack_demo

use std::sync::Arc;

use contracts::{Messenger, SendContext};
use dispatcher::Dispatcher;
use messengers::SlackMessenger;
use observability::{LogTarget, ObservabilityConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    observability::init_with_config(
        ObservabilityConfig::default().with_target(LogTarget::Stdout),
    )?;

    let slack = SlackMessenger::builder()
        .token(std::env::var("SLACK_TOKEN")?)
        .channel(std::env::var("SLACK_CHANNEL")?)
        // One section block with markdown text
        .blocks(vec![json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "Hello, World!" }
        })])
        .build()?;

    let dispatcher = Dispatcher::with_messengers([Arc::new(slack) as Arc<dyn Messenger>]);
    dispatcher.send_all(&SendContext::background()).await?;

    tracing::info!("Message sent");
    Ok(())
}
