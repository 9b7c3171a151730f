//! Query system for slipgraph note graphs
//!
//! Read-only lookups, alias-hierarchy walks and tag-cluster expansion over a
//! frozen [`Graph`](crate::graph::Graph).

mod engine;
mod find;
mod lineage;
mod neighborhood;
mod types;
mod walk;

pub use engine::{NoteView, Query};
pub use find::FindQuery;
pub use neighborhood::{ClusterQuery, NeighborQuery};
pub use types::{
    AliasEntry, Ancestor, Descendant, Direction, EdgeKind, ElementEdge, Elements, QueryResult,
};
pub use walk::EdgeWalk;
