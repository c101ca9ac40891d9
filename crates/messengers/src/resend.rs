//! ResendMessenger - transactional email via the Resend API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contracts::{Messenger, NofyError, SendContext, DEFAULT_TIMEOUT_MS};
use requester::{HttpRequester, Method, Request, Requester, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Resend emails endpoint
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Email body posted to Resend
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResendMessage {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Messenger sending one email through Resend
pub struct ResendMessenger {
    name: String,
    url: String,
    token: String,
    timeout: Duration,
    message: ResendMessage,
    requester: Arc<dyn Requester>,
}

impl ResendMessenger {
    pub fn builder() -> ResendMessengerBuilder {
        ResendMessengerBuilder::default()
    }

    pub fn message(&self) -> &ResendMessage {
        &self.message
    }
}

#[async_trait]
impl Messenger for ResendMessenger {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "resend_messenger_send",
        skip(self, ctx),
        fields(messenger = %self.name, recipients = self.message.to.len())
    )]
    async fn send(&self, ctx: &SendContext) -> Result<(), NofyError> {
        let body = serde_json::to_vec(&self.message)
            .map_err(|e| NofyError::serialization(format!("error marshaling message: {e}")))?;

        let request = Request::builder()
            .method(Method::POST)
            .url(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .payload(body)
            .timeout(self.timeout)
            .build()?;

        let response = self.requester.execute(ctx, request).await?;

        if response.status != StatusCode::OK {
            warn!(status = %response.status, "Resend rejected request");
            return Err(NofyError::provider(
                "resend",
                format!(
                    "error sending message: status-code: {} body: {}",
                    response.status.as_u16(),
                    response.text()
                ),
            ));
        }

        debug!("Resend email accepted");
        Ok(())
    }
}

/// Builder for [`ResendMessenger`]
pub struct ResendMessengerBuilder {
    name: String,
    url: String,
    token: String,
    timeout: Duration,
    message: ResendMessage,
    requester: Option<Arc<dyn Requester>>,
}

impl Default for ResendMessengerBuilder {
    fn default() -> Self {
        Self {
            name: "resend".to_string(),
            url: RESEND_API_URL.to_string(),
            token: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            message: ResendMessage::default(),
            requester: None,
        }
    }
}

impl ResendMessengerBuilder {
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

    pub fn message(mut self, message: ResendMessage) -> Self {
        self.message = message;
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
    /// `missing token`, `missing timeout`, `missing from`, `missing to` or `missing subject`.
    pub fn build(self) -> Result<ResendMessenger, NofyError> {
        if self.token.trim().is_empty() {
            return Err(NofyError::missing("token"));
        }
        if self.timeout.is_zero() {
            return Err(NofyError::missing("timeout"));
        }
        if self.message.from.trim().is_empty() {
            return Err(NofyError::missing("from"));
        }
        if self.message.to.is_empty() {
            return Err(NofyError::missing("to"));
        }
        if self.message.subject.trim().is_empty() {
            return Err(NofyError::missing("subject"));
        }

        Ok(ResendMessenger {
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
