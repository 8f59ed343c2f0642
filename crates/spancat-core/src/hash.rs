//! Task identity hashing
//!
//! Two-level identities over task content, computed with xxHash64 for speed.
//! The input hash identifies the source document (what was annotated); the
//! task hash identifies one concrete annotation question about it (which
//! spans, which options). Splitting a document into per-span tasks keeps the
//! input hash and refreshes the task hash.

use serde_json::{Map, Value};
use xxhash_rust::xxh3::xxh3_64;

use crate::task::Task;

/// Keys that determine the input hash.
pub const INPUT_KEYS: &[&str] = &["text"];

/// Keys that, together with the input hash, determine the task hash.
pub const TASK_KEYS: &[&str] = &["spans", "label", "options"];

/// Serialize the selected keys in a fixed order so the hash is independent
/// of map insertion order. Missing keys hash as JSON null.
fn canonical_json(map: &Map<String, Value>, keys: &[&str]) -> String {
    let fields: Vec<Value> = keys
        .iter()
        .map(|key| {
            Value::Array(vec![
                Value::String((*key).to_string()),
                map.get(*key).cloned().unwrap_or(Value::Null),
            ])
        })
        .collect();
    Value::Array(fields).to_string()
}

/// Identity of the source document underlying a task.
pub fn input_hash(task: &Task) -> u64 {
    xxh3_64(canonical_json(&task.0, INPUT_KEYS).as_bytes())
}

/// Identity of one annotation task. Salted with the input hash so the same
/// span content in different documents never collides.
pub fn task_hash(task: &Task) -> u64 {
    let input = task.input_hash().unwrap_or_else(|| input_hash(task));
    let payload = format!("{input}:{}", canonical_json(&task.0, TASK_KEYS));
    xxh3_64(payload.as_bytes())
}

/// Populate `_input_hash` and `_task_hash` on a task.
///
/// An existing input hash is kept (per-span tasks must stay grouped under
/// their parent document); the task hash is always recomputed.
pub fn set_hashes(task: &mut Task) {
    if task.input_hash().is_none() {
        task.set_input_hash(input_hash(task));
    }
    task.set_task_hash(task_hash(task));
}
