//! Pool errors

use thiserror::Error;

/// Errors returned by pool construction and submission
///
/// Job failures are not `PoolError`s: they travel on the errors channel
/// as [`crate::JobError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Builder finished without a process function
    #[error("missing process function")]
    MissingProcess,

    /// Worker builder finished without a required binding
    #[error("missing worker binding: {0}")]
    MissingBinding(&'static str),

    /// Pool is stopping or stopped; the job was not accepted
    #[error("pool stopped")]
    Stopped,
}
