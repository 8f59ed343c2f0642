//! Re-joining per-span tasks into per-document tasks
//!
//! The inverse of [`split_spans`](crate::preprocess::split_spans): after an
//! annotator answers a batch of single-span tasks, the batch is regrouped
//! into one task per source document, with the task-level answers moved down
//! into the span they were really about.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::task::{Span, Task};

/// A batch of answers could not be re-joined into per-document tasks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    /// A task in the batch does not carry exactly one span. The stream was
    /// not split into per-span tasks, or the split was bypassed.
    #[error("task {task_hash:?} carries {count} spans, expected exactly one per answered task")]
    MalformedRecord {
        task_hash: Option<u64>,
        count: usize,
    },

    /// A task has no `_input_hash`, so it cannot be grouped under its
    /// source document.
    #[error("task {task_hash:?} has no _input_hash to group by")]
    MissingInputHash { task_hash: Option<u64> },

    /// A span descriptor is not an object or lacks a numeric `start`
    /// offset, so the group cannot be ordered.
    #[error("span of task {task_hash:?} has no numeric 'start' offset")]
    MissingStart { task_hash: Option<u64> },
}

/// Regroup a batch of answered single-span tasks into per-document tasks.
///
/// Tasks are grouped by `_input_hash` (explicitly, so records of one
/// document need not arrive adjacent to each other) and each group is
/// emitted as one task, in the order the groups were first encountered.
/// Within a group, spans are ordered by ascending `start`; spans with equal
/// `start` keep their arrival order (stable sort).
///
/// Each field named in `fields` is copied from task level into the span it
/// belongs to and removed from the emitted task's top level. Fields absent
/// on an answer are simply not copied. All other top-level fields of the
/// emitted task are taken from the group's first member by sort order.
///
/// Fails without emitting anything if any task violates the single-span
/// contract, lacks an input hash, or carries a span without a `start`.
pub fn join_spans(answers: &[Task], fields: &[String]) -> Result<Vec<Task>, JoinError> {
    let mut order: Vec<u64> = Vec::new();
    let mut groups: HashMap<u64, Vec<(u64, &Task)>> = HashMap::new();

    for task in answers {
        let input_hash = task.input_hash().ok_or(JoinError::MissingInputHash {
            task_hash: task.task_hash(),
        })?;
        let span = single_span(task)?;
        let start = span
            .get("start")
            .and_then(Value::as_u64)
            .ok_or(JoinError::MissingStart {
                task_hash: task.task_hash(),
            })?;

        match groups.entry(input_hash) {
            Entry::Vacant(slot) => {
                order.push(input_hash);
                slot.insert(vec![(start, task)]);
            }
            Entry::Occupied(mut slot) => slot.get_mut().push((start, task)),
        }
    }

    let mut docs = Vec::with_capacity(order.len());
    for input_hash in order {
        let mut members = groups.remove(&input_hash).unwrap_or_default();
        // Stable: equal starts keep arrival order.
        members.sort_by_key(|(start, _)| *start);

        // Seed from the first member; shared fields are assumed identical
        // across the group and are not verified.
        let mut doc = members[0].1.clone();
        let mut spans = Vec::with_capacity(members.len());

        for (_, task) in &members {
            let mut span = single_span(task)?;
            for field in fields {
                if let Some(value) = task.get(field) {
                    span.insert(field.clone(), value.clone());
                }
            }
            spans.push(span);
        }

        doc.set_spans(spans);
        for field in fields {
            doc.remove(field);
        }
        docs.push(doc);
    }

    tracing::debug!(
        answers = answers.len(),
        documents = docs.len(),
        "joined span batch"
    );
    Ok(docs)
}

/// The one span an answered task must carry.
fn single_span(task: &Task) -> Result<Span, JoinError> {
    let spans = task.spans().map(Vec::as_slice).unwrap_or_default();
    match spans {
        [Value::Object(map)] => Ok(Span(map.clone())),
        [_] => Err(JoinError::MissingStart {
            task_hash: task.task_hash(),
        }),
        other => Err(JoinError::MalformedRecord {
            task_hash: task.task_hash(),
            count: other.len(),
        }),
    }
}
