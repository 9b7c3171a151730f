//! Note-level adjacency built when the model is frozen

use super::node::NoteId;
use std::collections::BTreeMap;

/// Forward and reverse adjacency lists keyed by note
///
/// Edges are unique per `(src, dest)` pair and kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    forward: BTreeMap<NoteId, Vec<NoteId>>,
    reverse: BTreeMap<NoteId, Vec<NoteId>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `src -> dest`; returns false if the edge was already present
    pub fn add(&mut self, src: NoteId, dest: NoteId) -> bool {
        let outgoing = self.forward.entry(src).or_default();
        if outgoing.contains(&dest) {
            return false;
        }
        outgoing.push(dest);
        self.reverse.entry(dest).or_default().push(src);
        true
    }

    pub fn outgoing(&self, id: NoteId) -> &[NoteId] {
        self.forward.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, id: NoteId) -> &[NoteId] {
        self.reverse.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges, ordered by source
    pub fn edges(&self) -> impl Iterator<Item = (NoteId, NoteId)> + '_ {
        self.forward
            .iter()
            .flat_map(|(src, dests)| dests.iter().map(move |dest| (*src, *dest)))
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
