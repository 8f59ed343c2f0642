//! Relay between the commit and persistence callbacks
//!
//! The host annotation loop offers two hooks per answered batch: `update`,
//! whose return value it discards, and `before_db`, whose return value is
//! what actually gets written. The joined batch therefore has to travel
//! from the first hook to the second through shared state. [`JoinBridge`]
//! is that state made explicit: a single-slot mailbox with a typed
//! empty/joined distinction instead of an ambient global.
//!
//! The two hooks run sequentially on one batch at a time; the mutex exists
//! so both registered closures can share the slot, not to make concurrent
//! batch commits safe.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::join::{join_spans, JoinError};
use crate::task::{Task, DEFAULT_OUTCOME_FIELDS};

/// The persistence hook ran outside its contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// `before_db` was called before any batch was committed through
    /// `on_update` in this process.
    #[error("before_db called with no committed batch; update must run first")]
    NoCommittedBatch,
}

enum BatchState {
    Empty,
    Joined(Vec<Task>),
}

/// Single-slot mailbox carrying the joined batch from `update` to
/// `before_db`. Cheap to clone; clones share the slot.
#[derive(Clone)]
pub struct JoinBridge {
    state: Arc<Mutex<BatchState>>,
    fields: Arc<Vec<String>>,
}

impl JoinBridge {
    /// A bridge relocating the given task-level outcome fields.
    pub fn new(fields: Vec<String>) -> Self {
        JoinBridge {
            state: Arc::new(Mutex::new(BatchState::Empty)),
            fields: Arc::new(fields),
        }
    }

    /// Commit hook: re-join the answered batch and store the result.
    ///
    /// The host discards this hook's return value, so the joined tasks are
    /// parked in the slot for [`before_db`](Self::before_db) to pick up.
    /// Each commit overwrites the previous batch.
    pub fn on_update(&self, answers: &[Task]) -> Result<(), JoinError> {
        let joined = join_spans(answers, &self.fields)?;
        tracing::debug!(documents = joined.len(), "batch committed");
        *self.lock() = BatchState::Joined(joined);
        Ok(())
    }

    /// Persistence hook: return the most recently committed batch.
    ///
    /// The answers the host passes in are the flat per-span tasks and are
    /// deliberately ignored; only the joined form is persisted.
    pub fn before_db(&self, _answers: &[Task]) -> Result<Vec<Task>, BridgeError> {
        match &*self.lock() {
            BatchState::Joined(docs) => Ok(docs.clone()),
            BatchState::Empty => Err(BridgeError::NoCommittedBatch),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for JoinBridge {
    fn default() -> Self {
        Self::new(
            DEFAULT_OUTCOME_FIELDS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        )
    }
}
