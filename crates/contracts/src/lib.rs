//! # Contracts
//!
//! Frozen interface contracts shared by every nofy crate: the `Messenger`
//! capability, the send context, the error taxonomy and the config model.
//! Business crates depend on this crate, never the reverse.

mod config;
mod context;
mod error;
mod fault;
mod messenger;

pub use config::*;
pub use context::SendContext;
pub use error::NofyError;
pub use fault::panic_message;
pub use messenger::Messenger;

/// Re-exported so implementors don't need their own dependency
pub use async_trait::async_trait;
