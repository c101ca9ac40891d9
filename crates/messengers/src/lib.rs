//! # Messengers
//!
//! Backend adapters implementing `contracts::Messenger`.
//!
//! - `SlackMessenger`: Block Kit messages via chat.postMessage
//! - `ResendMessenger`: email via the Resend API
//! - `LogMessenger`: tracing only
//!
//! `build_messenger` / `build_messengers` create them from `MessengerConfig`.

mod factory;
mod log;
mod resend;
mod slack;

pub use self::factory::{build_messenger, build_messengers};
pub use self::log::LogMessenger;
pub use self::resend::{ResendMessage, ResendMessenger, ResendMessengerBuilder, RESEND_API_URL};
pub use self::slack::{SlackMessage, SlackMessenger, SlackMessengerBuilder, SLACK_API_URL};
