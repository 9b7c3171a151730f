//! Slipgraph: note graph index for slipbox-style knowledge bases
//!
//! Builds a validated graph of notes from the facts a note extractor emits,
//! answers queries over it, and commits it to SQLite.
//!
//! # Core Concepts
//!
//! - **Notes**: atomic content units with a stable integer id
//! - **Links**: direct references between notes, with a backlink for each
//! - **Aliases**: hierarchical names (`1a`, `1a2`) ordering notes into sequences
//! - **Tags**: labels whose sequence edges form per-tag clusters
//!
//! # Example
//!
//! ```
//! use slipgraph::{FactStore, NoteId, Query};
//!
//! let mut store = FactStore::new();
//! store.add_note(1, "Origin", "notes.md");
//! store.add_note(2, "Follow-up", "notes.md");
//! store.add_raw_link("1", "#2", "");
//! // Note 1 declares the alias "1a" for note 2
//! store.add_raw_link("1", "#2", "/a");
//!
//! let graph = store.build().graph;
//! let query = Query::new(&graph);
//! let children: Vec<_> = query.children("1").collect();
//! assert_eq!(children.len(), 1);
//! assert_eq!(children[0].alias, "1a");
//! assert_eq!(children[0].note.id, NoteId::new(2));
//! ```

pub mod check;
pub mod classify;
pub mod config;
mod graph;
pub mod input;
pub mod query;
pub mod storage;

pub use check::{CheckConfig, Finding};
pub use config::{Config, ConfigError};
pub use graph::{
    Adjacency, Alias, Build, BuildReport, Citation, DomainError, Fact, FactStore, Graph, GraphModel,
    Insertion, Link, Note, NoteId, NoteRef, RawFact, Reference, ReferenceError, Sequence, Tag,
    Warning,
};
pub use input::{read_facts, read_facts_from_path, FactReader, InputError};
pub use query::{Direction, Elements, FindQuery, NoteView, Query};
pub use storage::{CommitReport, GraphSink, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
