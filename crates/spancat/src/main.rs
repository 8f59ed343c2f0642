//! spancat - span-level multiple-choice annotation
//!
//! Bridges "one label per document" classification and "one label per span"
//! annotation: documents are split into one choice task per span, and the
//! answered tasks are re-grouped into per-document records before they are
//! persisted.
//!
//! Usage:
//!   spancat span-manual <dataset> <model> <source>   Prepare a per-span task stream
//!   spancat rejoin <input>                           Re-group answered span tasks
//!   spancat completions <shell>                      Generate shell completions

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use spancat_core::{
    join_spans, load_tasks, span_manual, textcat_manual, Loader, Matcher, PhrasePatterns,
    TaskStream,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spancat", version, about = "Span-level multiple-choice text annotation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a span-annotation session: split each document into one
    /// choice task per span and write the prepared stream as JSONL
    SpanManual {
        /// Dataset to save annotations to
        dataset: String,
        /// Tokenizer/model spec recorded for the host (e.g. blank:en)
        model: String,
        /// Data to annotate (file path or '-' to read from standard input)
        source: String,
        /// Loader (guessed from the file extension if not set)
        #[arg(long, value_name = "FORMAT")]
        loader: Option<Loader>,
        /// Comma-separated label(s) to annotate or text file with one label per line
        #[arg(short = 'l', long, value_name = "LABELS")]
        label: String,
        /// Treat labels as mutually exclusive (otherwise a span can take
        /// several labels at once)
        #[arg(short = 'E', long)]
        exclusive: bool,
        /// Comma-separated list of dataset IDs whose annotations to exclude
        #[arg(short = 'e', long, value_name = "IDS")]
        exclude: Option<String>,
        /// Path to a JSONL match-patterns file for pre-labelling spans
        #[arg(long, value_name = "PATH")]
        patterns: Option<PathBuf>,
        /// Write the prepared stream here instead of stdout
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Re-group answered per-span tasks into one record per document
    Rejoin {
        /// Answered span tasks (JSONL file or '-' for standard input)
        input: String,
        /// Comma-separated task-level fields to move into the spans
        #[arg(long, default_value = "accept,answer", value_name = "FIELDS")]
        fields: String,
        /// Write the joined records here instead of stdout
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::SpanManual {
            dataset,
            model,
            source,
            loader,
            label,
            exclusive,
            exclude,
            patterns,
            output,
        } => run_span_manual(
            &dataset, &model, &source, loader, &label, exclusive, exclude, patterns, output,
        ),
        Commands::Rejoin {
            input,
            fields,
            output,
        } => run_rejoin(&input, &fields, output),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "spancat", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_span_manual(
    dataset: &str,
    model: &str,
    source: &str,
    loader: Option<Loader>,
    label: &str,
    exclusive: bool,
    exclude: Option<String>,
    patterns: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let labels = resolve_labels(label)?;
    if labels.is_empty() {
        bail!("at least one label is required (--label)");
    }
    let exclude = exclude.as_deref().map(split_string).unwrap_or_default();

    tracing::debug!(dataset, model, source, labels = labels.len(), "composing span recipe");
    let base = textcat_manual(dataset, source, loader, &labels, exclusive, &exclude)?;
    let matcher: Option<Box<dyn Matcher>> = match patterns {
        Some(path) => Some(Box::new(PhrasePatterns::from_disk(&path)?)),
        None => None,
    };

    let mut recipe = span_manual(base, &labels, matcher);
    recipe.set_config("model", model);

    let count = write_jsonl(recipe.stream, output.as_deref())?;
    eprintln!(
        "{} {} span tasks prepared for dataset '{}'",
        "✓".green(),
        count.to_string().bold(),
        recipe.dataset
    );
    Ok(())
}

fn run_rejoin(input: &str, fields: &str, output: Option<PathBuf>) -> Result<()> {
    let loader = Loader::guess(input).unwrap_or(Loader::Jsonl);
    let answers = load_tasks(input, Some(loader))?;
    let fields = split_string(fields);
    let docs = join_spans(&answers, &fields)?;

    let answered = answers.len();
    let stream: TaskStream = Box::new(docs.into_iter());
    let count = write_jsonl(stream, output.as_deref())?;
    eprintln!(
        "{} {} answered spans joined into {} documents",
        "✓".green(),
        answered.to_string().bold(),
        count.to_string().bold()
    );
    Ok(())
}

/// Write a task stream as JSONL to a file, or to stdout when no path is
/// given. Returns the number of tasks written.
fn write_jsonl(stream: TaskStream, output: Option<&Path>) -> Result<usize> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating '{}'", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    let mut count = 0;
    for task in stream {
        let line = serde_json::to_string(&task).context("serializing task")?;
        writeln!(writer, "{line}").context("writing task stream")?;
        count += 1;
    }
    writer.flush().context("flushing task stream")?;
    Ok(count)
}

/// Comma-separated labels, or a text file with one label per line.
fn resolve_labels(arg: &str) -> Result<Vec<String>> {
    if Path::new(arg).is_file() {
        let content = std::fs::read_to_string(arg)
            .with_context(|| format!("reading labels from '{arg}'"))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    } else {
        Ok(split_string(arg))
    }
}

fn split_string(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
