//! The validating graph model and its frozen form
//!
//! A [`GraphModel`] accepts facts one at a time and keeps the cross-links
//! between notes, aliases and sequences in step. [`GraphModel::freeze`]
//! consumes it into a read-only [`Graph`].

use super::edge::{Alias, AliasRecord, Citation, Link, Reference, Sequence, Tag};
use super::error::{DomainError, ReferenceError, Warning};
use super::fact::{Fact, Insertion};
use super::index::Adjacency;
use super::node::{Note, NoteId, NoteRecord, NoteRef};
use std::collections::BTreeMap;
use std::mem;
use tracing::{debug, info, warn};

/// Graph under construction
#[derive(Debug, Default)]
pub struct GraphModel {
    notes: BTreeMap<NoteId, NoteRecord>,
    links: Vec<Link>,
    aliases: BTreeMap<String, AliasRecord>,
    sequences: Vec<Sequence>,
    /// Sequences whose aliases were unknown when inserted
    pending: Vec<Sequence>,
    tags: Vec<Tag>,
    citations: Vec<Citation>,
    /// Cited keys and their text, empty until a reference arrives
    bibliography: BTreeMap<String, String>,
    warnings: Vec<Warning>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and apply one fact
    pub fn insert(&mut self, fact: impl Into<Fact>) -> Result<Insertion, DomainError> {
        fact.into().add_to(self)
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    fn warn(&mut self, warning: Warning) -> Insertion {
        warn!("{warning}");
        self.warnings.push(warning.clone());
        Insertion::Rejected(warning)
    }

    fn require_note(&self, role: &'static str, id: NoteId) -> Result<(), ReferenceError> {
        if self.notes.contains_key(&id) {
            Ok(())
        } else {
            debug!(role, %id, "dropping fact for missing note");
            Err(ReferenceError::MissingNote { role, id })
        }
    }

    pub(crate) fn add_note(&mut self, note: Note) -> Result<Insertion, DomainError> {
        note.validate()?;
        let Note {
            id,
            title,
            filename,
        } = note;

        let Some(existing) = self.notes.get_mut(&id) else {
            self.notes.insert(id, NoteRecord::new(title, filename));
            return Ok(Insertion::Applied);
        };
        if existing.title == title && existing.filename == filename {
            return Ok(Insertion::Unchanged);
        }

        // Last write wins; adjacency already attached to the id is kept
        let replaced_title = mem::replace(&mut existing.title, title.clone());
        let replaced_filename = mem::replace(&mut existing.filename, filename.clone());
        let warning = Warning::DuplicateNote {
            id,
            title,
            filename,
            replaced_title,
            replaced_filename,
        };
        warn!("{warning}");
        self.warnings.push(warning);
        Ok(Insertion::Applied)
    }

    pub(crate) fn add_link(&mut self, link: Link) -> Insertion {
        if let Err(err) = self.require_note("link source", link.src) {
            return Insertion::Unresolved(err);
        }
        if let Err(err) = self.require_note("link target", link.dest) {
            if let Some(record) = self.notes.get_mut(&link.src) {
                if !record.broken_links.contains(&link.dest) {
                    record.broken_links.push(link.dest);
                }
            }
            return Insertion::Unresolved(err);
        }

        let index = self.links.len();
        let (src, dest) = (link.src, link.dest);
        self.links.push(link);
        if let Some(record) = self.notes.get_mut(&src) {
            record.links.push(index);
        }
        if let Some(record) = self.notes.get_mut(&dest) {
            record.backlinks.push(index);
        }
        Insertion::Applied
    }

    pub(crate) fn add_alias(&mut self, alias: Alias) -> Result<Insertion, DomainError> {
        alias.validate()?;
        for (role, id) in [("alias", alias.id), ("alias owner", alias.owner)] {
            if let Err(err) = self.require_note(role, id) {
                return Ok(Insertion::Unresolved(err));
            }
        }

        if let Some(existing) = self.aliases.get(&alias.alias) {
            if existing.id == alias.id {
                return Ok(Insertion::Unchanged);
            }
            let warning = Warning::DuplicateAlias {
                existing: existing.id,
                rejected: alias.id,
                alias: alias.alias,
            };
            return Ok(self.warn(warning));
        }

        if let Some(record) = self.notes.get_mut(&alias.id) {
            record.aliases.push(alias.alias.clone());
        }
        self.aliases.insert(
            alias.alias,
            AliasRecord {
                id: alias.id,
                owner: alias.owner,
                parent: None,
                children: Vec::new(),
            },
        );
        Ok(Insertion::Applied)
    }

    pub(crate) fn add_sequence(&mut self, sequence: Sequence) -> Result<Insertion, DomainError> {
        sequence.validate()?;
        match self.apply_sequence(&sequence) {
            Ok(insertion) => Ok(insertion),
            Err(err) => {
                debug!(prev = %sequence.prev, next = %sequence.next, "holding sequence until freeze");
                if !self.pending.contains(&sequence) {
                    self.pending.push(sequence);
                }
                Ok(Insertion::Unresolved(err))
            }
        }
    }

    /// Link `prev` and `next` if both aliases are known
    fn apply_sequence(&mut self, sequence: &Sequence) -> Result<Insertion, ReferenceError> {
        for alias in [&sequence.prev, &sequence.next] {
            if !self.aliases.contains_key(alias) {
                return Err(ReferenceError::UnknownAlias(alias.clone()));
            }
        }

        // The parent is fixed by the alias grammar, so a second edge into
        // `next` can only repeat the first one
        match self.aliases.get_mut(&sequence.next) {
            Some(next) if next.parent.is_none() => next.parent = Some(sequence.prev.clone()),
            _ => return Ok(Insertion::Unchanged),
        }
        if let Some(prev) = self.aliases.get_mut(&sequence.prev) {
            prev.children.push(sequence.next.clone());
        }
        self.sequences.push(sequence.clone());
        Ok(Insertion::Applied)
    }

    pub(crate) fn add_tag(&mut self, tag: Tag) -> Result<Insertion, DomainError> {
        tag.validate()?;
        if let Err(err) = self.require_note("tag", tag.id) {
            return Ok(Insertion::Unresolved(err));
        }
        let Some(record) = self.notes.get_mut(&tag.id) else {
            return Ok(Insertion::Unchanged);
        };
        if record.tags.contains(&tag.tag) {
            return Ok(Insertion::Unchanged);
        }
        record.tags.push(tag.tag.clone());
        self.tags.push(tag);
        Ok(Insertion::Applied)
    }

    pub(crate) fn add_citation(&mut self, citation: Citation) -> Result<Insertion, DomainError> {
        citation.validate()?;
        if let Err(err) = self.require_note("citation", citation.id) {
            return Ok(Insertion::Unresolved(err));
        }
        let Some(record) = self.notes.get_mut(&citation.id) else {
            return Ok(Insertion::Unchanged);
        };
        if record.citations.contains(&citation.key) {
            return Ok(Insertion::Unchanged);
        }
        record.citations.push(citation.key.clone());
        self.bibliography.entry(citation.key.clone()).or_default();
        self.citations.push(citation);
        Ok(Insertion::Applied)
    }

    pub(crate) fn add_reference(&mut self, reference: Reference) -> Insertion {
        match self.bibliography.get_mut(&reference.key) {
            Some(text) => {
                *text = reference.text;
                Insertion::Applied
            }
            None => {
                debug!(key = %reference.key, "dropping reference nobody cites");
                Insertion::Unresolved(ReferenceError::UncitedKey(reference.key))
            }
        }
    }

    /// Flag a note whose source contained a link with an empty target
    pub fn mark_empty_link(&mut self, id: NoteId) -> Insertion {
        match self.notes.get_mut(&id) {
            Some(record) => {
                record.has_empty_link = true;
                Insertion::Applied
            }
            None => Insertion::Unresolved(ReferenceError::MissingNote {
                role: "empty link",
                id,
            }),
        }
    }

    /// Finish the build.
    ///
    /// Pending sequences get one more chance to resolve; the rest become
    /// [`Warning::DanglingSequence`]. Note-level sequence adjacency and the
    /// per-tag clusters are computed here, once.
    pub fn freeze(mut self) -> (Graph, Vec<Warning>) {
        let mut dangling = Vec::new();
        for sequence in mem::take(&mut self.pending) {
            let Err(err) = self.apply_sequence(&sequence) else {
                continue;
            };
            let missing = match err {
                ReferenceError::UnknownAlias(alias) => alias,
                _ => sequence.prev.clone(),
            };
            self.warn(Warning::DanglingSequence {
                prev: sequence.prev.clone(),
                next: sequence.next.clone(),
                missing,
            });
            dangling.push(sequence);
        }

        // Targets that arrived after the link are no longer missing
        let known: Vec<NoteId> = self.notes.keys().copied().collect();
        for record in self.notes.values_mut() {
            record
                .broken_links
                .retain(|dest| known.binary_search(dest).is_err());
        }

        let mut sequence_edges = Adjacency::new();
        for sequence in &self.sequences {
            let (Some(prev), Some(next)) = (
                self.aliases.get(&sequence.prev),
                self.aliases.get(&sequence.next),
            ) else {
                continue;
            };
            sequence_edges.add(prev.id, next.id);
        }

        let mut clusters: BTreeMap<String, Adjacency> = BTreeMap::new();
        for (src, dest) in sequence_edges.edges() {
            let (Some(src_record), Some(dest_record)) = (self.notes.get(&src), self.notes.get(&dest))
            else {
                continue;
            };
            for tag in &src_record.tags {
                if dest_record.tags.contains(tag) {
                    clusters.entry(tag.clone()).or_default().add(src, dest);
                }
            }
        }

        let warnings = mem::take(&mut self.warnings);
        info!(
            notes = self.notes.len(),
            links = self.links.len(),
            aliases = self.aliases.len(),
            sequences = self.sequences.len(),
            clusters = clusters.len(),
            warnings = warnings.len(),
            "graph frozen"
        );

        let graph = Graph {
            notes: self.notes,
            links: self.links,
            aliases: self.aliases,
            sequences: self.sequences,
            dangling,
            tags: self.tags,
            citations: self.citations,
            bibliography: self.bibliography,
            sequence_edges,
            clusters,
        };
        (graph, warnings)
    }
}

/// A frozen, read-only note graph
///
/// Produced once per build by [`GraphModel::freeze`]. Shared by reference
/// with the query engine and the storage sink.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    notes: BTreeMap<NoteId, NoteRecord>,
    links: Vec<Link>,
    aliases: BTreeMap<String, AliasRecord>,
    sequences: Vec<Sequence>,
    /// Sequences that never resolved; still offered to the sink
    dangling: Vec<Sequence>,
    tags: Vec<Tag>,
    citations: Vec<Citation>,
    bibliography: BTreeMap<String, String>,
    sequence_edges: Adjacency,
    clusters: BTreeMap<String, Adjacency>,
}

impl Graph {
    pub fn note(&self, id: NoteId) -> Option<NoteRef<'_>> {
        self.notes.get(&id).map(|record| NoteRef {
            id,
            title: &record.title,
            filename: &record.filename,
        })
    }

    /// All notes, ordered by id
    pub fn notes(&self) -> impl Iterator<Item = NoteRef<'_>> {
        self.notes.iter().map(|(id, record)| NoteRef {
            id: *id,
            title: &record.title,
            filename: &record.filename,
        })
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn contains_note(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }

    /// All links, in insertion order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All aliases, ordered by alias
    pub fn aliases(&self) -> impl Iterator<Item = Alias> + '_ {
        self.aliases.iter().map(|(alias, record)| Alias {
            id: record.id,
            owner: record.owner,
            alias: alias.clone(),
        })
    }

    /// Note an alias denotes
    pub fn alias_note(&self, alias: &str) -> Option<NoteId> {
        self.aliases.get(alias).map(|record| record.id)
    }

    /// Resolved sequences, in the order they were applied
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Sequences left unresolved at freeze
    pub fn dangling_sequences(&self) -> &[Sequence] {
        &self.dangling
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Cited keys with their text (empty when no reference was supplied)
    pub fn bibliography(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bibliography
            .iter()
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    pub(crate) fn record(&self, id: NoteId) -> Option<&NoteRecord> {
        self.notes.get(&id)
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (NoteId, &NoteRecord)> {
        self.notes.iter().map(|(id, record)| (*id, record))
    }

    pub(crate) fn alias(&self, alias: &str) -> Option<&AliasRecord> {
        self.aliases.get(alias)
    }

    /// Stored alias string together with its record
    pub(crate) fn alias_entry(&self, alias: &str) -> Option<(&str, &AliasRecord)> {
        self.aliases
            .get_key_value(alias)
            .map(|(key, record)| (key.as_str(), record))
    }

    pub(crate) fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub(crate) fn bibliography_text(&self, key: &str) -> Option<&str> {
        self.bibliography.get(key).map(String::as_str)
    }

    /// Note-level sequence edges: the note owning `prev` to the note owning `next`
    pub fn sequence_edges(&self) -> &Adjacency {
        &self.sequence_edges
    }

    /// Sequence edges between notes that both carry `tag`
    pub fn cluster(&self, tag: &str) -> Option<&Adjacency> {
        self.clusters.get(tag)
    }

    pub(crate) fn cluster_entry(&self, tag: &str) -> Option<(&str, &Adjacency)> {
        self.clusters
            .get_key_value(tag)
            .map(|(key, adjacency)| (key.as_str(), adjacency))
    }
}
