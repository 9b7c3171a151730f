//! Storage trait definitions

use crate::graph::{Graph, Warning};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Note ID {0} does not fit in an SQLite integer")]
    IdOutOfRange(u64),

    #[error("Invalid row in {table}: {detail}")]
    InvalidRow { table: &'static str, detail: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Tables written by a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Table {
    Notes,
    Files,
    Aliases,
    Sequences,
    Links,
    Tags,
    Citations,
    Bibliography,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Notes,
        Table::Files,
        Table::Aliases,
        Table::Sequences,
        Table::Links,
        Table::Tags,
        Table::Citations,
        Table::Bibliography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Notes => "Notes",
            Table::Files => "Files",
            Table::Aliases => "Aliases",
            Table::Sequences => "Sequences",
            Table::Links => "Links",
            Table::Tags => "Tags",
            Table::Citations => "Citations",
            Table::Bibliography => "Bibliography",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of committing a graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitReport {
    /// Rows inserted, per table
    pub inserted: std::collections::BTreeMap<Table, usize>,
    /// Rows that were already present, identical
    pub unchanged: usize,
    pub warnings: Vec<Warning>,
}

impl CommitReport {
    pub fn record_insert(&mut self, table: Table, rows: usize) {
        *self.inserted.entry(table).or_default() += rows;
    }

    pub fn inserted(&self, table: Table) -> usize {
        self.inserted.get(&table).copied().unwrap_or(0)
    }

    pub fn warn(&mut self, warning: Warning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Trait for graph storage sinks
///
/// Each `save_*` method writes one category in its own transaction. A row
/// that violates a constraint is reported in the [`CommitReport`] and the
/// transaction still commits; any other error rolls the category back.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait GraphSink: Send + Sync {
    /// Notes, and the files they come from
    fn save_notes(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    /// Citations, bibliography keys and bibliography text
    fn save_citations(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    fn save_aliases(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    /// Resolved sequences, then the dangling ones
    fn save_sequences(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    fn save_links(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    fn save_tags(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()>;

    /// Write every category, in dependency order.
    ///
    /// Categories are independent: if one fails, the ones before it stay
    /// written and the ones after it are not attempted.
    fn commit(&self, graph: &Graph) -> StorageResult<CommitReport> {
        let mut report = CommitReport::default();
        self.save_notes(graph, &mut report)?;
        self.save_citations(graph, &mut report)?;
        self.save_aliases(graph, &mut report)?;
        self.save_sequences(graph, &mut report)?;
        self.save_links(graph, &mut report)?;
        self.save_tags(graph, &mut report)?;
        info!(
            notes = report.inserted(Table::Notes),
            links = report.inserted(Table::Links),
            unchanged = report.unchanged,
            warnings = report.warnings.len(),
            "commit finished"
        );
        Ok(report)
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphSink + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
