//! Loading annotation tasks from source files
//!
//! Sources are JSONL (one task per line), JSON (an array of tasks), or
//! plain text (one task per non-empty line). The loader is guessed from
//! the file extension and can be forced explicitly; `-` reads newline
//! delimited JSON from standard input.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::task::Task;

/// Input format of an annotation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    /// Newline-delimited JSON, one task object per line.
    Jsonl,
    /// A single JSON array of task objects.
    Json,
    /// Plain text, one `{"text": ...}` task per non-empty line.
    Text,
}

impl Loader {
    /// Guess the loader from a source path's extension.
    pub fn guess(source: &str) -> Option<Self> {
        match Path::new(source)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase()
            .as_str()
        {
            "jsonl" | "ndjson" => Some(Loader::Jsonl),
            "json" => Some(Loader::Json),
            "txt" | "text" => Some(Loader::Text),
            _ => None,
        }
    }
}

impl FromStr for Loader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(Loader::Jsonl),
            "json" => Ok(Loader::Json),
            "txt" | "text" => Ok(Loader::Text),
            other => bail!("unknown loader '{other}' (expected jsonl, json, or txt)"),
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Loader::Jsonl => "jsonl",
            Loader::Json => "json",
            Loader::Text => "txt",
        };
        f.write_str(name)
    }
}

/// Load tasks from a source path, or from standard input when the source
/// is `-` (stdin defaults to JSONL).
pub fn load_tasks(source: &str, loader: Option<Loader>) -> Result<Vec<Task>> {
    let (content, loader) = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading tasks from stdin")?;
        (buf, loader.unwrap_or(Loader::Jsonl))
    } else {
        let loader = match loader.or_else(|| Loader::guess(source)) {
            Some(loader) => loader,
            None => bail!("cannot guess loader for '{source}'; pass one explicitly"),
        };
        let content = std::fs::read_to_string(source)
            .with_context(|| format!("reading tasks from '{source}'"))?;
        (content, loader)
    };

    let tasks = parse_tasks(&content, loader)
        .with_context(|| format!("parsing '{source}' as {loader}"))?;
    tracing::debug!(source, %loader, tasks = tasks.len(), "loaded tasks");
    Ok(tasks)
}

fn parse_tasks(content: &str, loader: Loader) -> Result<Vec<Task>> {
    match loader {
        Loader::Jsonl => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("line {}", i + 1))
            })
            .collect(),
        Loader::Json => {
            serde_json::from_str(content).context("expected a JSON array of task objects")
        }
        Loader::Text => Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Task::from_text)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn guesses_loader_from_extension() {
        assert_eq!(Loader::guess("data.jsonl"), Some(Loader::Jsonl));
        assert_eq!(Loader::guess("data.ndjson"), Some(Loader::Jsonl));
        assert_eq!(Loader::guess("data.JSON"), Some(Loader::Json));
        assert_eq!(Loader::guess("notes.txt"), Some(Loader::Text));
        assert_eq!(Loader::guess("archive.csv"), None);
        assert_eq!(Loader::guess("no_extension"), None);
    }

    #[test]
    fn loads_jsonl() {
        let file = source_file(
            ".jsonl",
            "{\"text\": \"first\"}\n\n{\"text\": \"second\", \"meta\": {\"n\": 2}}\n",
        );
        let tasks = load_tasks(file.path().to_str().unwrap(), None).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text(), Some("first"));
        assert_eq!(tasks[1].get("meta"), Some(&serde_json::json!({"n": 2})));
    }

    #[test]
    fn loads_json_array() {
        let file = source_file(".json", "[{\"text\": \"a\"}, {\"text\": \"b\"}]");
        let tasks = load_tasks(file.path().to_str().unwrap(), None).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].text(), Some("b"));
    }

    #[test]
    fn loads_plain_text_lines() {
        let file = source_file(".txt", "first line\n\nsecond line\n");
        let tasks = load_tasks(file.path().to_str().unwrap(), None).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text(), Some("first line"));
    }

    #[test]
    fn explicit_loader_overrides_extension() {
        let file = source_file(".dat", "just some text\n");
        let tasks = load_tasks(file.path().to_str().unwrap(), Some(Loader::Text)).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn unknown_extension_without_loader_fails() {
        let file = source_file(".dat", "x");
        assert!(load_tasks(file.path().to_str().unwrap(), None).is_err());
    }

    #[test]
    fn bad_jsonl_reports_line_number() {
        let file = source_file(".jsonl", "{\"text\": \"ok\"}\nnot json\n");
        let err = load_tasks(file.path().to_str().unwrap(), None).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn loader_parses_from_str() {
        assert_eq!("jsonl".parse::<Loader>().unwrap(), Loader::Jsonl);
        assert_eq!("TXT".parse::<Loader>().unwrap(), Loader::Text);
        assert!("parquet".parse::<Loader>().is_err());
    }
}
