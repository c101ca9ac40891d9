//! Per-messenger outcomes of one fan-out

use std::time::Duration;

use contracts::NofyError;

/// Result of one messenger's send
#[derive(Debug)]
pub struct SendOutcome {
    /// Registry position at dispatch time
    pub index: usize,
    /// Messenger name
    pub messenger: String,
    pub result: Result<(), NofyError>,
    pub elapsed: Duration,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// All outcomes of one `send_all`, in completion order
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: Vec<SendOutcome>,
}

impl DispatchReport {
    pub(crate) fn new(outcomes: Vec<SendOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[SendOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &SendOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SendOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(SendOutcome::is_success)
    }

    /// Collapse into the aggregate error (`"errors: e1; e2"`), keeping completion order
    pub fn into_result(self) -> Result<(), NofyError> {
        let errors = self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.err())
            .collect();
        NofyError::aggregate(errors)
    }
}
