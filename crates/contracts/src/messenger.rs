//! Messenger trait - Dispatcher input interface
//!
//! Defines the abstract interface for notification backends.

use async_trait::async_trait;

use crate::{NofyError, SendContext};

/// Notification backend trait
///
/// All backend adapters (Slack, Resend, ...) implement this trait. The
/// dispatcher only ever sees `Arc<dyn Messenger>`.
///
/// Implementations must be safe to call concurrently with other messengers
/// and must not leave tasks running after `send` returns.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Messenger name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver the configured message once
    ///
    /// # Errors
    /// Returns configuration, transport or provider errors. Should observe
    /// `ctx` and return [`NofyError::Cancelled`] when it fires first.
    async fn send(&self, ctx: &SendContext) -> Result<(), NofyError>;
}
