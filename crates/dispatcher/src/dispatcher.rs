//! Dispatcher - concurrent fan-out of one notification to every messenger

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use contracts::{panic_message, Messenger, MessengerConfig, NofyError, SendContext};
use requester::Requester;

use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::report::{DispatchReport, SendOutcome};

/// Registry of messengers and the fan-out over them
///
/// Messengers are identified by `Arc` identity: the same instance may be
/// registered twice and is then sent to twice.
#[derive(Default, Clone)]
pub struct Dispatcher {
    messengers: Vec<Arc<dyn Messenger>>,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher with an initial set of messengers
    pub fn with_messengers<I>(messengers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Messenger>>,
    {
        Self {
            messengers: messengers.into_iter().collect(),
            metrics: Arc::default(),
        }
    }

    /// Append a messenger; duplicates are kept
    pub fn add_messenger(&mut self, messenger: Arc<dyn Messenger>) {
        debug!(messenger = messenger.name(), "Messenger added");
        self.messengers.push(messenger);
    }

    /// Remove the first registration of `messenger`
    ///
    /// Returns `false` (and changes nothing) if it was not registered.
    pub fn remove_messenger(&mut self, messenger: &Arc<dyn Messenger>) -> bool {
        let position = self
            .messengers
            .iter()
            .position(|m| std::ptr::addr_eq(Arc::as_ptr(m), Arc::as_ptr(messenger)));

        match position {
            Some(index) => {
                self.messengers.remove(index);
                debug!(messenger = messenger.name(), "Messenger removed");
                true
            }
            None => false,
        }
    }

    pub fn messengers(&self) -> &[Arc<dyn Messenger>] {
        &self.messengers
    }

    pub fn len(&self) -> usize {
        self.messengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messengers.is_empty()
    }

    /// Get dispatch counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Send to every messenger concurrently and wait for all of them
    ///
    /// Returns `Ok(())` when every send succeeded (or nothing is registered),
    /// otherwise an aggregate error listing each failure in completion order.
    pub async fn send_all(&self, ctx: &SendContext) -> Result<(), NofyError> {
        self.send_all_detailed(ctx).await.into_result()
    }

    /// Like [`send_all`](Self::send_all), keeping one outcome per messenger
    ///
    /// A panicking messenger is reported as [`NofyError::Panicked`] and
    /// does not affect the other sends.
    #[instrument(
        name = "dispatcher_send_all",
        skip(self, ctx),
        fields(messengers = self.messengers.len())
    )]
    pub async fn send_all_detailed(&self, ctx: &SendContext) -> DispatchReport {
        self.metrics.inc_dispatch_count();

        if self.messengers.is_empty() {
            debug!("No messengers registered");
            observability::record_dispatch(0, 0);
            return DispatchReport::default();
        }

        info!(messengers = self.messengers.len(), "Dispatching notification");

        let mut tasks = JoinSet::new();
        let mut slots = HashMap::with_capacity(self.messengers.len());

        for (index, messenger) in self.messengers.iter().enumerate() {
            let name = messenger.name().to_string();
            let messenger = Arc::clone(messenger);
            let ctx = ctx.clone();
            let task_name = name.clone();
            let handle = tasks.spawn(async move {
                let started = Instant::now();
                let result = AssertUnwindSafe(messenger.send(&ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        Err(NofyError::panicked(&task_name, panic_message(payload.as_ref())))
                    });
                SendOutcome {
                    index,
                    messenger: task_name,
                    result,
                    elapsed: started.elapsed(),
                }
            });
            slots.insert(handle.id(), (index, name));
        }

        let outcomes = join_outcomes(tasks, slots, |outcome| self.observe(outcome)).await;

        let report = DispatchReport::new(outcomes);
        let failures = report.failure_count();
        observability::record_dispatch(report.len(), failures);

        if failures == 0 {
            info!(messengers = report.len(), "Notification delivered");
        } else {
            warn!(
                messengers = report.len(),
                failures, "Notification partially failed"
            );
        }

        report
    }

    fn observe(&self, outcome: &SendOutcome) {
        let elapsed_ms = outcome.elapsed.as_secs_f64() * 1000.0;
        observability::record_send(&outcome.messenger, outcome.is_success(), elapsed_ms);

        match &outcome.result {
            Ok(()) => {
                self.metrics.inc_send_success();
                debug!(messenger = %outcome.messenger, elapsed_ms, "Send succeeded");
            }
            Err(e) => {
                self.metrics.inc_send_failure();
                if e.is_panic() {
                    self.metrics.inc_panics_recovered();
                    observability::record_panic_recovered("dispatcher");
                    error!(messenger = %outcome.messenger, error = %e, "Messenger panicked");
                } else {
                    warn!(messenger = %outcome.messenger, error = %e, "Send failed");
                }
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.messengers.iter().map(|m| m.name()).collect();
        f.debug_struct("Dispatcher")
            .field("messengers", &names)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

/// Await every send task, in completion order
///
/// A task that ends without an outcome (aborted, or a panic that escaped
/// the barrier) is charged to the messenger it was spawned for.
async fn join_outcomes(
    mut tasks: JoinSet<SendOutcome>,
    mut slots: HashMap<task::Id, (usize, String)>,
    mut observe: impl FnMut(&SendOutcome),
) -> Vec<SendOutcome> {
    let mut outcomes = Vec::with_capacity(slots.len());

    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((id, outcome)) => {
                slots.remove(&id);
                outcome
            }
            Err(e) => {
                let Some((index, name)) = slots.remove(&e.id()) else {
                    error!(error = %e, "Send task finished without a slot");
                    continue;
                };
                let result = if e.is_panic() {
                    Err(NofyError::panicked(&name, panic_message(e.into_panic().as_ref())))
                } else {
                    Err(NofyError::other(format!("send task for '{name}' failed: {e}")))
                };
                SendOutcome {
                    index,
                    messenger: name,
                    result,
                    elapsed: Duration::ZERO,
                }
            }
        };
        observe(&outcome);
        outcomes.push(outcome);
    }

    outcomes
}

/// Create a dispatcher from messenger configs
#[instrument(name = "dispatcher_create", skip(configs, requester), fields(messengers = configs.len()))]
pub fn create_dispatcher(
    configs: &[MessengerConfig],
    requester: Arc<dyn Requester>,
) -> Result<Dispatcher, NofyError> {
    let messengers = messengers::build_messengers(configs, requester)?;
    Ok(Dispatcher::with_messengers(messengers))
}
