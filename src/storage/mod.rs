//! Storage backends for slipgraph
//!
//! A frozen graph is written out through the `GraphSink` trait.
//! The primary implementation is `SqliteStore` for persistent storage.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{CommitReport, GraphSink, OpenStore, StorageError, StorageResult, Table};
