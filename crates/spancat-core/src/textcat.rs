//! Document-level classification recipe
//!
//! The base recipe the span composer wraps: loads the source, hashes every
//! task, attaches the label options, and configures the choice interface.
//! Used standalone it annotates one label set per document.

use anyhow::Result;

use crate::hash;
use crate::loader::{load_tasks, Loader};
use crate::preprocess::add_label_options;
use crate::recipe::Recipe;
use crate::task::TaskStream;

/// Build the manual document-classification recipe.
///
/// `exclusive` renders the choices as mutually exclusive (single-select);
/// otherwise a document can take several labels at once.
pub fn textcat_manual(
    dataset: &str,
    source: &str,
    loader: Option<Loader>,
    labels: &[String],
    exclusive: bool,
    exclude: &[String],
) -> Result<Recipe> {
    let mut tasks = load_tasks(source, loader)?;
    for task in &mut tasks {
        hash::set_hashes(task);
    }

    let stream: TaskStream = Box::new(tasks.into_iter());
    let stream = add_label_options(stream, labels);

    let mut recipe = Recipe::new(dataset, stream);
    recipe.exclude = exclude.to_vec();
    recipe.set_config(
        "choice_style",
        if exclusive { "single" } else { "multiple" },
    );
    recipe.set_config("exclude_by", "input");
    Ok(recipe)
}
