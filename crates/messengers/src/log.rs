//! LogMessenger - emits the message via tracing

use async_trait::async_trait;
use contracts::{Messenger, NofyError, SendContext};
use tracing::{info, instrument};

/// Messenger that only logs, for dry runs and local debugging
pub struct LogMessenger {
    name: String,
    message: String,
}

impl LogMessenger {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Messenger for LogMessenger {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_messenger_send", skip(self, _ctx), fields(messenger = %self.name))]
    async fn send(&self, _ctx: &SendContext) -> Result<(), NofyError> {
        info!(messenger = %self.name, message = %self.message, "Notification");
        Ok(())
    }
}
