//! Annotation task and span records
//!
//! Tasks are the unit of annotation work: a JSON object with a handful of
//! well-known keys (`text`, `spans`, `_input_hash`, `_task_hash`, `options`)
//! plus arbitrary metadata that must survive every transform untouched.
//! Rather than a closed struct, both tasks and spans are thin newtypes over
//! `serde_json::Map` with typed accessors for the keys the pipeline cares
//! about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key carrying the identity of the source document. Stable across the
/// span split: every per-span task keeps its parent's input hash.
pub const INPUT_HASH_KEY: &str = "_input_hash";

/// Key carrying the identity of one annotation task. Fresh per span task.
pub const TASK_HASH_KEY: &str = "_task_hash";

/// Key holding the span descriptors of a task.
pub const SPANS_KEY: &str = "spans";

/// Key holding the source text.
pub const TEXT_KEY: &str = "text";

/// Key holding the selectable choice options for the rendering layer.
pub const OPTIONS_KEY: &str = "options";

/// Task-level annotation outcome fields that semantically belong to the
/// span once a document has been split into per-span tasks.
pub const DEFAULT_OUTCOME_FIELDS: &[&str] = &["accept", "answer"];

/// A lazily produced sequence of tasks.
pub type TaskStream = Box<dyn Iterator<Item = Task>>;

/// One annotation task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task(pub Map<String, Value>);

impl Task {
    /// Build a bare task around a piece of source text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(TEXT_KEY.to_string(), Value::String(text.into()));
        Task(map)
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get(TEXT_KEY).and_then(Value::as_str)
    }

    pub fn input_hash(&self) -> Option<u64> {
        self.0.get(INPUT_HASH_KEY).and_then(Value::as_u64)
    }

    pub fn set_input_hash(&mut self, hash: u64) {
        self.0.insert(INPUT_HASH_KEY.to_string(), Value::from(hash));
    }

    pub fn task_hash(&self) -> Option<u64> {
        self.0.get(TASK_HASH_KEY).and_then(Value::as_u64)
    }

    pub fn set_task_hash(&mut self, hash: u64) {
        self.0.insert(TASK_HASH_KEY.to_string(), Value::from(hash));
    }

    /// The raw span descriptors, if any.
    pub fn spans(&self) -> Option<&Vec<Value>> {
        self.0.get(SPANS_KEY).and_then(Value::as_array)
    }

    /// Replace the span descriptors.
    pub fn set_spans(&mut self, spans: Vec<Span>) {
        let values = spans.into_iter().map(Value::from).collect();
        self.0.insert(SPANS_KEY.to_string(), Value::Array(values));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

/// One span descriptor: character offsets into the task text plus
/// arbitrary metadata (label, pattern id, relocated outcome fields, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Span(pub Map<String, Value>);

impl Span {
    /// Build a span covering `[start, end)` in character offsets.
    pub fn new(start: usize, end: usize) -> Self {
        let mut map = Map::new();
        map.insert("start".to_string(), Value::from(start as u64));
        map.insert("end".to_string(), Value::from(end as u64));
        Span(map)
    }

    pub fn start(&self) -> Option<u64> {
        self.0.get("start").and_then(Value::as_u64)
    }

    pub fn end(&self) -> Option<u64> {
        self.0.get("end").and_then(Value::as_u64)
    }

    pub fn label(&self) -> Option<&str> {
        self.0.get("label").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }
}

impl From<Span> for Value {
    fn from(span: Span) -> Self {
        Value::Object(span.0)
    }
}

impl From<Task> for Value {
    fn from(task: Task) -> Self {
        Value::Object(task.0)
    }
}
