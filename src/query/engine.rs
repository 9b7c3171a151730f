//! Read-only entry point over a frozen graph

use super::find::FindQuery;
use super::lineage;
use super::neighborhood::{ClusterQuery, NeighborQuery};
use super::types::{AliasEntry, Ancestor, Descendant, Elements};
use crate::graph::{Graph, Link, NoteId, NoteRecord, NoteRef};
use std::collections::BTreeMap;

/// Queries against one [`Graph`]
///
/// Lookups of missing notes, aliases or tags return `None` or nothing;
/// no query fails.
#[derive(Debug, Clone, Copy)]
pub struct Query<'g> {
    graph: &'g Graph,
}

impl<'g> Query<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    pub fn graph(self) -> &'g Graph {
        self.graph
    }

    pub fn note(self, id: NoteId) -> Option<NoteView<'g>> {
        let record = self.graph.record(id)?;
        let note = self.graph.note(id)?;
        Some(NoteView {
            query: self,
            note,
            record,
        })
    }

    /// Outgoing links of `id`, in insertion order
    pub fn links(self, id: NoteId) -> impl Iterator<Item = &'g Link> + 'g {
        let indices = self.graph.record(id).map(|record| record.links.as_slice());
        self.resolve(indices.unwrap_or(&[]))
    }

    /// Incoming links of `id`, in insertion order
    pub fn backlinks(self, id: NoteId) -> impl Iterator<Item = &'g Link> + 'g {
        let indices = self.graph.record(id).map(|record| record.backlinks.as_slice());
        self.resolve(indices.unwrap_or(&[]))
    }

    fn resolve(self, indices: &'g [usize]) -> impl Iterator<Item = &'g Link> + 'g {
        let links = self.graph.links();
        indices.iter().filter_map(move |index| links.get(*index))
    }

    pub fn parent(self, alias: &str) -> Option<AliasEntry<'g>> {
        lineage::parent(self.graph, alias)
    }

    pub fn children(self, alias: &str) -> impl Iterator<Item = AliasEntry<'g>> + 'g {
        lineage::children(self.graph, alias)
    }

    /// Aliases above `alias`, nearest first
    pub fn ancestors(self, alias: &str) -> Vec<Ancestor<'g>> {
        lineage::ancestors(self.graph, alias)
    }

    /// Aliases below `alias`, breadth first
    pub fn descendants(self, alias: &str) -> Vec<Descendant<'g>> {
        lineage::descendants(self.graph, alias)
    }

    pub fn cluster_elements(self, tag: &str) -> Elements<'g> {
        ClusterQuery::tag(tag).execute(self.graph)
    }

    pub fn neighbor_elements(self, id: NoteId) -> Elements<'g> {
        NeighborQuery::around(id).execute(self.graph)
    }

    /// Notes nothing points to that point somewhere.
    ///
    /// Counts direct links and note-level sequence edges; self-links are
    /// ignored.
    pub fn entrypoints(self) -> Vec<NoteRef<'g>> {
        let mut degrees: BTreeMap<NoteId, (usize, usize)> = BTreeMap::new();
        let links = self.graph.links().iter().map(|link| (link.src, link.dest));
        let sequences = self.graph.sequence_edges().edges();

        for (src, dest) in links.chain(sequences) {
            if src == dest {
                continue;
            }
            degrees.entry(src).or_default().1 += 1;
            degrees.entry(dest).or_default().0 += 1;
        }

        degrees
            .into_iter()
            .filter(|(_, (indegree, outdegree))| *indegree == 0 && *outdegree > 0)
            .filter_map(|(id, _)| self.graph.note(id))
            .collect()
    }

    /// Notes carrying `tag`, ordered by id
    pub fn tagged(self, tag: &str) -> Vec<NoteRef<'g>> {
        FindQuery::new().with_tag(tag).execute(self.graph).notes
    }

    /// Tags of `id`, in insertion order
    pub fn tags(self, id: NoteId) -> &'g [String] {
        self.graph
            .record(id)
            .map(|record| record.tags.as_slice())
            .unwrap_or(&[])
    }

    /// Citation keys of `id`, in insertion order
    pub fn citations(self, id: NoteId) -> &'g [String] {
        self.graph
            .record(id)
            .map(|record| record.citations.as_slice())
            .unwrap_or(&[])
    }

    /// Bibliography text of a cited key; empty when no reference was given
    pub fn bibliography(self, key: &str) -> Option<&'g str> {
        self.graph.bibliography_text(key)
    }
}

/// A note with lazily derived adjacency
///
/// Every iterator is recomputed from the graph on each call.
#[derive(Debug, Clone, Copy)]
pub struct NoteView<'g> {
    query: Query<'g>,
    note: NoteRef<'g>,
    record: &'g NoteRecord,
}

impl<'g> NoteView<'g> {
    pub fn id(&self) -> NoteId {
        self.note.id
    }

    pub fn title(&self) -> &'g str {
        self.note.title
    }

    pub fn filename(&self) -> &'g str {
        self.note.filename
    }

    pub fn note_ref(&self) -> NoteRef<'g> {
        self.note
    }

    pub fn links(&self) -> impl Iterator<Item = &'g Link> + 'g {
        self.query.resolve(&self.record.links)
    }

    pub fn backlinks(&self) -> impl Iterator<Item = &'g Link> + 'g {
        self.query.resolve(&self.record.backlinks)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &'g str> + 'g {
        self.record.aliases.iter().map(String::as_str)
    }

    /// Parents of each of this note's aliases
    pub fn parents(&self) -> impl Iterator<Item = AliasEntry<'g>> + 'g {
        let query = self.query;
        self.aliases().filter_map(move |alias| query.parent(alias))
    }

    /// Children of each of this note's aliases
    pub fn children(&self) -> impl Iterator<Item = AliasEntry<'g>> + 'g {
        let query = self.query;
        self.aliases().flat_map(move |alias| query.children(alias))
    }

    pub fn tags(&self) -> &'g [String] {
        &self.record.tags
    }

    pub fn citations(&self) -> &'g [String] {
        &self.record.citations
    }

    pub fn has_empty_link(&self) -> bool {
        self.record.has_empty_link
    }
}
