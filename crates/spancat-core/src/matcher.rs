//! Pattern-based span suggestion
//!
//! The seam for pre-labelling a task stream before annotation. Model-backed
//! and token-level matchers live outside this crate; [`Matcher`] is the
//! interface they plug into, and [`PhrasePatterns`] is the built-in literal
//! phrase matcher loaded from a JSONL patterns file.

use std::path::Path;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::hash;
use crate::task::{Span, Task, TaskStream};

/// Labels a task stream with suggested spans.
///
/// Yields `(match identity, task)` pairs; callers typically keep only the
/// task. The matcher is consumed so the returned stream can own it.
pub trait Matcher {
    fn label(self: Box<Self>, stream: TaskStream) -> Box<dyn Iterator<Item = (u64, Task)>>;
}

/// One entry of a patterns file: `{"label": "ORG", "pattern": "acme corp"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub label: String,
    pub pattern: String,
}

/// Case-insensitive literal phrase matcher.
///
/// Emits spans with character offsets (not byte offsets), so downstream
/// consumers can slice the text by `chars()` regardless of encoding.
#[derive(Debug)]
pub struct PhrasePatterns {
    patterns: Vec<(String, Regex)>,
}

impl PhrasePatterns {
    /// Load patterns from a JSONL file of [`Pattern`] entries.
    pub fn from_disk(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading patterns from '{}'", path.display()))?;
        let patterns: Vec<Pattern> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("patterns line {}", i + 1))
            })
            .collect::<Result<_>>()?;
        tracing::debug!(path = %path.display(), patterns = patterns.len(), "loaded patterns");
        Self::from_patterns(patterns)
    }

    pub fn from_patterns(patterns: Vec<Pattern>) -> Result<Self> {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                let regex = RegexBuilder::new(&regex::escape(&p.pattern))
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("compiling pattern '{}'", p.pattern))?;
                Ok((p.label, regex))
            })
            .collect::<Result<_>>()?;
        Ok(PhrasePatterns { patterns: compiled })
    }

    /// All pattern matches in `text`, as spans sorted by start offset.
    fn find_spans(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (label, regex) in &self.patterns {
            for found in regex.find_iter(text) {
                let start = text[..found.start()].chars().count();
                let end = start + found.as_str().chars().count();
                let mut span = Span::new(start, end);
                span.insert("label", label.as_str());
                span.insert("text", found.as_str());
                spans.push(span);
            }
        }
        spans.sort_by_key(|span| (span.start(), span.end()));
        spans
    }
}

impl Matcher for PhrasePatterns {
    fn label(self: Box<Self>, stream: TaskStream) -> Box<dyn Iterator<Item = (u64, Task)>> {
        Box::new(stream.map(move |mut task| {
            let spans = task
                .text()
                .map(|text| self.find_spans(text))
                .unwrap_or_default();
            let match_id = match_identity(&spans);
            task.set_spans(spans);
            hash::set_hashes(&mut task);
            (match_id, task)
        }))
    }
}

/// Identity of a set of matches: hash over the (label, start, end) triples.
fn match_identity(spans: &[Span]) -> u64 {
    let mut key = String::new();
    for span in spans {
        key.push_str(span.label().unwrap_or(""));
        key.push(':');
        key.push_str(&format!("{:?}-{:?};", span.start(), span.end()));
    }
    xxh3_64(key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn matcher(entries: &[(&str, &str)]) -> Box<PhrasePatterns> {
        let patterns = entries
            .iter()
            .map(|(label, pattern)| Pattern {
                label: (*label).to_string(),
                pattern: (*pattern).to_string(),
            })
            .collect();
        Box::new(PhrasePatterns::from_patterns(patterns).unwrap())
    }

    fn label_one(m: Box<PhrasePatterns>, text: &str) -> Task {
        let stream: TaskStream = Box::new(std::iter::once(Task::from_text(text)));
        let (_, task) = m.label(stream).next().unwrap();
        task
    }

    #[test]
    fn finds_literal_phrases() {
        let task = label_one(matcher(&[("ORG", "Acme Corp")]), "Acme Corp hired everyone.");
        let spans = task.spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0]["start"], 0);
        assert_eq!(spans[0]["end"], 9);
        assert_eq!(spans[0]["label"], "ORG");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let task = label_one(matcher(&[("ORG", "acme corp")]), "Sued by ACME CORP today");
        assert_eq!(task.spans().map(Vec::len), Some(1));
    }

    #[test]
    fn offsets_are_character_based() {
        // Multibyte characters before the match: byte and char offsets differ.
        let task = label_one(matcher(&[("CITY", "Zürich")]), "Überall in Zürich");
        let spans = task.spans().unwrap();
        assert_eq!(spans[0]["start"], 11);
        assert_eq!(spans[0]["end"], 17);
    }

    #[test]
    fn spans_from_all_patterns_sorted_by_start() {
        let task = label_one(
            matcher(&[("B", "beta"), ("A", "alpha")]),
            "alpha then beta",
        );
        let spans = task.spans().unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0]["label"], "A");
        assert_eq!(spans[1]["label"], "B");
    }

    #[test]
    fn no_match_yields_empty_spans() {
        let task = label_one(matcher(&[("ORG", "acme")]), "nothing to see");
        assert_eq!(task.spans().map(Vec::len), Some(0));
    }

    #[test]
    fn labelled_tasks_get_hashes() {
        let task = label_one(matcher(&[("ORG", "acme")]), "acme acme");
        assert!(task.input_hash().is_some());
        assert!(task.task_hash().is_some());
    }

    #[test]
    fn loads_patterns_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".jsonl")
            .tempfile()
            .unwrap();
        writeln!(file, "{}", r#"{"label": "ORG", "pattern": "acme"}"#).unwrap();
        writeln!(file, "{}", r#"{"label": "PER", "pattern": "jane doe"}"#).unwrap();
        let m = PhrasePatterns::from_disk(file.path()).unwrap();
        assert_eq!(m.patterns.len(), 2);
    }

    #[test]
    fn bad_patterns_file_reports_line() {
        let mut file = tempfile::Builder::new()
            .suffix(".jsonl")
            .tempfile()
            .unwrap();
        writeln!(file, "{}", r#"{"label": "ORG", "pattern": "acme"}"#).unwrap();
        writeln!(file, "broken").unwrap();
        let err = PhrasePatterns::from_disk(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
