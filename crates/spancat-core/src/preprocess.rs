//! Stream preprocessing for span-level annotation
//!
//! Transforms applied to the task stream before it reaches the annotator:
//! splitting multi-span documents into one task per span, and attaching the
//! choice options the rendering layer needs on every task.

use serde_json::Value;

use crate::hash;
use crate::task::{Task, TaskStream, OPTIONS_KEY, SPANS_KEY};

/// Split each document task into one task per span.
///
/// A task with N spans yields N tasks, each carrying a single-element
/// `spans` list, the parent's `_input_hash`, and a fresh `_task_hash`.
/// The `options` key is dropped from the children (the split invalidates
/// it; callers re-attach options afterwards). Tasks with no spans yield
/// nothing.
pub fn split_spans(stream: TaskStream) -> TaskStream {
    Box::new(stream.flat_map(|task| {
        let spans: Vec<Value> = task.spans().cloned().unwrap_or_default();
        spans.into_iter().map(move |span| {
            let mut child = task.clone();
            child.insert(SPANS_KEY, Value::Array(vec![span]));
            child.remove(OPTIONS_KEY);
            hash::set_hashes(&mut child);
            child
        })
    }))
}

/// Attach a selectable option per label to every task in the stream.
///
/// The rendering layer requires the `options` key on choice tasks, and the
/// span split drops it, so this runs as the last stream transform.
pub fn add_label_options(stream: TaskStream, labels: &[String]) -> TaskStream {
    let options: Vec<Value> = labels
        .iter()
        .map(|label| serde_json::json!({ "id": label, "text": label }))
        .collect();
    Box::new(stream.map(move |mut task| {
        task.insert(OPTIONS_KEY, Value::Array(options.clone()));
        task
    }))
}
