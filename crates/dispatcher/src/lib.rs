//! # Dispatcher
//!
//! Notification fan-out.
//!
//! Responsible for:
//! - Holding the registry of messengers
//! - Sending one notification to all of them concurrently
//! - Isolating failing or panicking messengers from the rest
//! - Aggregating failures into one error (or a per-messenger report)

pub mod dispatcher;
pub mod metrics;
pub mod report;

pub use contracts::{Messenger, NofyError, SendContext};
pub use dispatcher::{create_dispatcher, Dispatcher};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use report::{DispatchReport, SendOutcome};
