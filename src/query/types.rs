//! Query types and result structures

use crate::graph::{NoteId, NoteRef};
use serde::Serialize;

/// Direction for edge traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow outgoing edges (source -> target)
    #[default]
    Outgoing,
    /// Follow incoming edges (target <- source)
    Incoming,
    /// Follow edges in both directions
    Both,
}

/// Result of a find query
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult<'g> {
    /// Notes matching the query
    pub notes: Vec<NoteRef<'g>>,
    /// Total count (may differ from notes.len() if limit applied)
    pub total_count: usize,
}

/// An alias and the note it denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AliasEntry<'g> {
    pub note: NoteRef<'g>,
    pub alias: &'g str,
}

/// One hop up the alias hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ancestor<'g> {
    pub note: NoteRef<'g>,
    pub alias: &'g str,
    /// Alias one step below, where this hop started
    pub child_alias: &'g str,
    pub child_id: NoteId,
}

/// One strict descendant in the alias hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descendant<'g> {
    pub note: NoteRef<'g>,
    pub alias: &'g str,
    pub parent_alias: &'g str,
    pub parent_id: NoteId,
}

/// Kind of an edge in a rendered neighbourhood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Direct link
    Link,
    /// Sequence edge inside a tag cluster
    Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementEdge<'g> {
    pub src: NoteId,
    pub dest: NoteId,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'g str>,
}

/// Nodes and edges of a subgraph, ready for rendering
#[derive(Debug, Clone, Default, Serialize)]
pub struct Elements<'g> {
    /// Note the subgraph was expanded around, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<NoteId>,
    pub nodes: Vec<NoteRef<'g>>,
    pub edges: Vec<ElementEdge<'g>>,
}

impl Elements<'_> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: NoteId) -> bool {
        self.nodes.iter().any(|note| note.id == id)
    }

    pub fn contains_edge(&self, src: NoteId, dest: NoteId) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.src == src && edge.dest == dest)
    }
}
