//! The task-configuration object handed to the host annotation loop
//!
//! A recipe bundles everything the host needs to run one annotation
//! session: the dataset to save into, the task stream, the lifecycle hooks,
//! and the UI configuration map. The host calls `update` when a batch of
//! answers is committed (and discards its return value) and `before_db`
//! right before persisting, writing whatever that hook returns.

use serde_json::{Map, Value};

use crate::task::{Task, TaskStream};

/// Batch-commit hook. The host ignores the `Ok` value.
pub type UpdateHook = Box<dyn FnMut(&[Task]) -> anyhow::Result<()>>;

/// Pre-persistence hook. The returned tasks are what gets stored.
pub type BeforeDbHook = Box<dyn FnMut(&[Task]) -> anyhow::Result<Vec<Task>>>;

pub struct Recipe {
    /// Dataset the host saves annotations into.
    pub dataset: String,
    /// The tasks to annotate.
    pub stream: TaskStream,
    /// Dataset IDs whose existing annotations exclude tasks from the stream.
    pub exclude: Vec<String>,
    pub update: Option<UpdateHook>,
    pub before_db: Option<BeforeDbHook>,
    /// UI / session configuration forwarded to the host.
    pub config: Map<String, Value>,
}

impl Recipe {
    pub fn new(dataset: impl Into<String>, stream: TaskStream) -> Self {
        Recipe {
            dataset: dataset.into(),
            stream,
            exclude: Vec::new(),
            update: None,
            before_db: None,
            config: Map::new(),
        }
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.config.insert(key.into(), value.into());
    }
}

impl std::fmt::Debug for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe")
            .field("dataset", &self.dataset)
            .field("exclude", &self.exclude)
            .field("update", &self.update.is_some())
            .field("before_db", &self.before_db.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
