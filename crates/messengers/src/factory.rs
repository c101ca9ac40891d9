//! Build messengers from configuration

use std::sync::Arc;
use std::time::Duration;

use contracts::{Messenger, MessengerConfig, MessengerKind, NofyError};
use requester::Requester;
use tracing::{debug, instrument};

use crate::{LogMessenger, ResendMessage, ResendMessenger, SlackMessenger};

/// Create one messenger from its configuration
///
/// HTTP backends share `requester`.
#[instrument(
    name = "messenger_factory_build",
    skip(config, requester),
    fields(messenger = %config.name, kind = config.kind_name())
)]
pub fn build_messenger(
    config: &MessengerConfig,
    requester: Arc<dyn Requester>,
) -> Result<Arc<dyn Messenger>, NofyError> {
    let messenger: Arc<dyn Messenger> = match &config.kind {
        MessengerKind::Slack(slack) => {
            let mut builder = SlackMessenger::builder()
                .name(&config.name)
                .token(&slack.token)
                .channel(&slack.channel)
                .blocks(slack.blocks.clone())
                .timeout(Duration::from_millis(slack.timeout_ms))
                .requester(requester);
            if let Some(url) = &slack.url {
                builder = builder.url(url);
            }
            Arc::new(builder.build().map_err(|e| creation_error(&config.name, e))?)
        }
        MessengerKind::Resend(resend) => {
            let message = ResendMessage {
                from: resend.from.clone(),
                to: resend.to.clone(),
                cc: resend.cc.clone(),
                subject: resend.subject.clone(),
                html: resend.html.clone(),
                text: resend.text.clone(),
            };
            let mut builder = ResendMessenger::builder()
                .name(&config.name)
                .token(&resend.token)
                .message(message)
                .timeout(Duration::from_millis(resend.timeout_ms))
                .requester(requester);
            if let Some(url) = &resend.url {
                builder = builder.url(url);
            }
            Arc::new(builder.build().map_err(|e| creation_error(&config.name, e))?)
        }
        MessengerKind::Log(log) => Arc::new(LogMessenger::new(&config.name, &log.message)),
    };

    debug!("Messenger created");
    Ok(messenger)
}

/// Create every configured messenger, failing on the first invalid one
pub fn build_messengers(
    configs: &[MessengerConfig],
    requester: Arc<dyn Requester>,
) -> Result<Vec<Arc<dyn Messenger>>, NofyError> {
    configs
        .iter()
        .map(|config| build_messenger(config, Arc::clone(&requester)))
        .collect()
}

fn creation_error(name: &str, err: NofyError) -> NofyError {
    NofyError::config(name, format!("failed to create messenger '{name}': {err}"))
}
