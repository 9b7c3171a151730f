//! Core graph data structures

mod edge;
mod error;
mod fact;
mod index;
mod model;
mod node;
mod store;

#[cfg(test)]
mod tests;

pub use edge::{Alias, Citation, Link, Reference, Sequence, Tag};
pub use error::{DomainError, ReferenceError, Warning};
pub use fact::{Fact, Insertion};
pub use index::Adjacency;
pub use model::{Graph, GraphModel};
pub use node::{Note, NoteId, NoteRef};
pub use store::{Build, BuildReport, FactStore, RawFact};

pub(crate) use node::NoteRecord;
