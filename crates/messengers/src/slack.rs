//! SlackMessenger - block messages via chat.postMessage

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contracts::{Messenger, NofyError, SendContext, DEFAULT_TIMEOUT_MS};
use requester::{HttpRequester, Method, Request, Requester, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Slack Web API endpoint
pub const SLACK_API_URL: &str = "https://slack.com/api/chat.postMessage";

/// Message body posted to Slack
///
/// Blocks are Block Kit JSON, passed through as configured.
/// See <https://api.slack.com/reference/messaging/blocks>.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlackMessage {
    pub channel: String,
    pub blocks: Vec<Value>,
}

/// Response envelope from Slack
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Messenger posting one block message to a Slack channel
pub struct SlackMessenger {
    name: String,
    url: String,
    token: String,
    timeout: Duration,
    message: SlackMessage,
    requester: Arc<dyn Requester>,
}

impl SlackMessenger {
    pub fn builder() -> SlackMessengerBuilder {
        SlackMessengerBuilder::default()
    }

    pub fn message(&self) -> &SlackMessage {
        &self.message
    }

    fn encode(&self) -> Result<Vec<u8>, NofyError> {
        serde_json::to_vec(&self.message)
            .map_err(|e| NofyError::serialization(format!("error marshaling message: {e}")))
    }
}

#[async_trait]
impl Messenger for SlackMessenger {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "slack_messenger_send",
        skip(self, ctx),
        fields(messenger = %self.name, channel = %self.message.channel)
    )]
    async fn send(&self, ctx: &SendContext) -> Result<(), NofyError> {
        let request = Request::builder()
            .method(Method::POST)
            .url(&self.url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .payload(self.encode()?)
            .timeout(self.timeout)
            .build()?;

        let response = self.requester.execute(ctx, request).await?;

        if response.status != StatusCode::OK {
            warn!(status = %response.status, "Slack rejected request");
            return Err(NofyError::provider(
                "slack",
                format!(
                    "error sending message. status code: {}",
                    response.status.as_u16()
                ),
            ));
        }

        let envelope: SlackResponse = response.json()?;
        if !envelope.ok {
            let reason = envelope.error.unwrap_or_default();
            warn!(reason = %reason, "Slack returned ok=false");
            return Err(NofyError::provider(
                "slack",
                format!("error sending message: {reason}"),
            ));
        }

        debug!("Slack message delivered");
        Ok(())
    }
}

/// Builder for [`SlackMessenger`]
pub struct SlackMessengerBuilder {
    name: String,
    url: String,
    token: String,
    timeout: Duration,
    message: SlackMessage,
    blocks_set: bool,
    requester: Option<Arc<dyn Requester>>,
}

impl Default for SlackMessengerBuilder {
    fn default() -> Self {
        Self {
            name: "slack".to_string(),
            url: SLACK_API_URL.to_string(),
            token: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            message: SlackMessage::default(),
            blocks_set: false,
            requester: None,
        }
    }
}

impl SlackMessengerBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.message.channel = channel.into();
        self
    }

    pub fn blocks(mut self, blocks: Vec<Value>) -> Self {
        self.message.blocks = blocks;
        self.blocks_set = true;
        self
    }

    /// Set channel and blocks at once
    pub fn message(mut self, message: SlackMessage) -> Self {
        self.message = message;
        self.blocks_set = true;
        self
    }

    /// Endpoint override (tests, proxies)
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn requester(mut self, requester: Arc<dyn Requester>) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    /// `missing token`, `missing timeout`, `missing channel` or `missing content`.
    pub fn build(self) -> Result<SlackMessenger, NofyError> {
        if self.token.trim().is_empty() {
            return Err(NofyError::missing("token"));
        }
        if self.timeout.is_zero() {
            return Err(NofyError::missing("timeout"));
        }
        if self.message.channel.trim().is_empty() {
            return Err(NofyError::missing("channel"));
        }
        if !self.blocks_set || self.message.blocks.is_empty() {
            return Err(NofyError::missing("content"));
        }

        Ok(SlackMessenger {
            name: self.name,
            url: self.url,
            token: self.token,
            timeout: self.timeout,
            message: self.message,
            requester: self
                .requester
                .unwrap_or_else(|| Arc::new(HttpRequester::new())),
        })
    }
}
