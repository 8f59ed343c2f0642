//! spancat-core: span-level annotation on top of document classification
//!
//! This crate provides:
//! - the task/span data model and identity hashing
//! - `split_spans` / `join_spans`: per-span annotation of a document and
//!   re-grouping of answered spans back into per-document records
//! - the `JoinBridge` relaying joined batches from the commit hook to the
//!   persistence hook
//! - source loaders, the base classification recipe, and the span recipe
//!   composer

pub mod bridge;
pub mod compose;
pub mod hash;
pub mod join;
pub mod loader;
pub mod matcher;
pub mod preprocess;
pub mod recipe;
pub mod task;
pub mod textcat;

// Re-exports
pub use bridge::{BridgeError, JoinBridge};
pub use compose::span_manual;
pub use hash::set_hashes;
pub use join::{join_spans, JoinError};
pub use loader::{load_tasks, Loader};
pub use matcher::{Matcher, Pattern, PhrasePatterns};
pub use preprocess::{add_label_options, split_spans};
pub use recipe::{BeforeDbHook, Recipe, UpdateHook};
pub use task::{Span, Task, TaskStream, DEFAULT_OUTCOME_FIELDS};
pub use textcat::textcat_manual;
