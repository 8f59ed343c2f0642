//! Span-level annotation recipe composer
//!
//! Turns the document-level classification recipe into a per-span one:
//! optional pattern matching, the span split, fresh label options, and the
//! join bridge wired into the commit/persist hooks so that per-span answers
//! are stored re-grouped by document.

use crate::bridge::JoinBridge;
use crate::matcher::Matcher;
use crate::preprocess::{add_label_options, split_spans};
use crate::recipe::Recipe;

/// Compose the span-annotation recipe on top of a document-level base.
///
/// The stream is (optionally) pre-labelled by `matcher`, split into one
/// task per span, and given one choice option per label (the split drops
/// the options the base recipe attached). A [`JoinBridge`] with the default
/// outcome fields is registered as the `update` / `before_db` hook pair, so
/// the host persists per-document tasks with span-level answers. Choices
/// auto-accept on selection.
pub fn span_manual(mut base: Recipe, labels: &[String], matcher: Option<Box<dyn Matcher>>) -> Recipe {
    let mut stream = base.stream;
    if let Some(matcher) = matcher {
        stream = Box::new(matcher.label(stream).map(|(_, task)| task));
    }
    let stream = split_spans(stream);
    base.stream = add_label_options(stream, labels);

    let bridge = JoinBridge::default();
    let committer = bridge.clone();
    base.update = Some(Box::new(move |answers| {
        committer.on_update(answers).map_err(anyhow::Error::from)
    }));
    let persister = bridge;
    base.before_db = Some(Box::new(move |answers| {
        persister.before_db(answers).map_err(anyhow::Error::from)
    }));

    base.set_config("choice_auto_accept", true);
    base
}
