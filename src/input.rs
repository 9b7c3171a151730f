//! JSON-lines fact reader
//!
//! The note extractor writes one [`RawFact`] per line. Blank lines are
//! ignored; a malformed line is reported with its line number and skipped.

use crate::graph::{FactStore, RawFact};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl InputError {
    /// One-based line number, for errors tied to a line
    pub fn line(&self) -> Option<usize> {
        match self {
            InputError::Json { line, .. } => Some(*line),
            InputError::Io(_) => None,
        }
    }
}

/// Iterator over the facts of a JSON-lines stream
///
/// Yields `(line number, fact)`. Stops after the first read error.
pub struct FactReader<R> {
    lines: io::Lines<R>,
    line: usize,
    failed: bool,
}

impl<R: BufRead> FactReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            failed: false,
        }
    }
}

impl FactReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for FactReader<R> {
    type Item = (usize, Result<RawFact, InputError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.line += 1;
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => {
                    self.failed = true;
                    return Some((self.line, Err(err.into())));
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            let fact = serde_json::from_str(&text).map_err(|source| InputError::Json {
                line: self.line,
                source,
            });
            return Some((self.line, fact));
        }
    }
}

/// Feed every well-formed line of `reader` into `store`.
///
/// Malformed lines are logged and returned; a read error aborts.
pub fn read_facts(
    reader: impl BufRead,
    store: &mut FactStore,
) -> Result<Vec<InputError>, InputError> {
    let mut skipped = Vec::new();
    let mut count = 0;
    for (_, fact) in FactReader::new(reader) {
        match fact {
            Ok(fact) => {
                store.collect(fact);
                count += 1;
            }
            Err(InputError::Io(err)) => return Err(InputError::Io(err)),
            Err(err) => {
                warn!(error = %err, "skipping malformed line");
                skipped.push(err);
            }
        }
    }
    debug!(count, skipped = skipped.len(), "read fact stream");
    Ok(skipped)
}

/// [`read_facts`] over a file
pub fn read_facts_from_path(
    path: impl AsRef<Path>,
    store: &mut FactStore,
) -> Result<Vec<InputError>, InputError> {
    let file = File::open(path)?;
    read_facts(BufReader::new(file), store)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r##"{"kind":"note","id":1,"title":"First","filename":"a.md"}

{"kind":"note","id":2,"title":"Second","filename":"a.md"}
{"kind":"link","src":"1","target":"#2","title":"see"}
not json
{"kind":"colour","id":1}
{"kind":"tag","id":2,"tag":"#rust"}
"##;

    #[test]
    fn test_reader_numbers_lines() {
        let lines: Vec<usize> = FactReader::new(STREAM.as_bytes())
            .map(|(line, _)| line)
            .collect();
        assert_eq!(lines, vec![1, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_reader_parses_facts() {
        let facts: Vec<RawFact> = FactReader::new(STREAM.as_bytes())
            .filter_map(|(_, fact)| fact.ok())
            .collect();
        assert_eq!(facts.len(), 4);
        assert_eq!(
            facts[2],
            RawFact::Link {
                src: "1".to_string(),
                target: "#2".to_string(),
                title: "see".to_string(),
            }
        );
    }

    #[test]
    fn test_read_facts_skips_malformed_lines() {
        let mut store = FactStore::new();
        let skipped = read_facts(STREAM.as_bytes(), &mut store).unwrap();

        let lines: Vec<_> = skipped.iter().filter_map(InputError::line).collect();
        assert_eq!(lines, vec![5, 6]);

        let graph = store.build().graph;
        assert_eq!(graph.note_count(), 2);
        assert_eq!(graph.links().len(), 1);
    }

    #[test]
    fn test_error_message_has_line() {
        let mut store = FactStore::new();
        let skipped = read_facts("\n{\"kind\":\n".as_bytes(), &mut store).unwrap();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].to_string().starts_with("line 2: "));
    }

    #[test]
    fn test_read_facts_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FactStore::new();
        let result = read_facts_from_path(dir.path().join("facts.jsonl"), &mut store);
        assert!(matches!(result, Err(InputError::Io(_))));
    }
}
