//! Fact collection for one build
//!
//! [`FactStore`] accepts facts in any order, sorts them into categories and
//! replays them into a [`GraphModel`] in dependency order when built.

use super::edge::{Alias, Citation, Link, Reference, Sequence, Tag};
use super::error::{DomainError, Warning};
use super::fact::{Fact, Insertion};
use super::model::{Graph, GraphModel};
use super::node::{Note, NoteId};
use crate::classify::{classify, parent_alias, Classified, Declaration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// An untyped fact as produced by the note extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawFact {
    Note {
        id: i64,
        title: String,
        filename: String,
    },
    /// A link as written in the note body, before classification
    Link {
        src: String,
        target: String,
        #[serde(default)]
        title: String,
    },
    Tag {
        id: i64,
        tag: String,
    },
    Citation {
        id: i64,
        key: String,
    },
    Reference {
        key: String,
        text: String,
    },
}

/// Summary of a build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Facts replayed into the model
    pub facts: usize,
    /// Facts that changed the model
    pub applied: usize,
    /// Facts dropped because a note or alias was missing at insertion
    pub unresolved: usize,
    /// Raw links the classifier did not accept
    pub ignored_links: usize,
    /// Structurally invalid facts
    pub rejected: Vec<DomainError>,
    pub warnings: Vec<Warning>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.warnings.is_empty()
    }
}

/// Result of [`FactStore::build`]
#[derive(Debug)]
pub struct Build {
    pub graph: Graph,
    pub report: BuildReport,
}

/// Collects the facts of one build
#[derive(Debug, Default)]
pub struct FactStore {
    notes: Vec<Note>,
    aliases: Vec<Alias>,
    sequences: Vec<Sequence>,
    links: Vec<Link>,
    tags: Vec<Tag>,
    citations: Vec<Citation>,
    references: Vec<Reference>,
    /// Owners whose root alias is already queued
    roots: BTreeSet<NoteId>,
    empty_links: BTreeSet<NoteId>,
    ignored_links: usize,
    rejected: Vec<DomainError>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of typed facts collected so far
    pub fn len(&self) -> usize {
        self.notes.len()
            + self.aliases.len()
            + self.sequences.len()
            + self.links.len()
            + self.tags.len()
            + self.citations.len()
            + self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a fact from the extractor
    pub fn collect(&mut self, raw: RawFact) {
        match raw {
            RawFact::Note {
                id,
                title,
                filename,
            } => self.add_note(id, title, filename),
            RawFact::Link { src, target, title } => self.add_raw_link(&src, &target, &title),
            RawFact::Tag { id, tag } => self.add_tag(id, tag),
            RawFact::Citation { id, key } => self.add_citation(id, key),
            RawFact::Reference { key, text } => self.add_reference(key, text),
        }
    }

    fn reject(&mut self, err: DomainError) {
        warn!(error = %err, "rejecting fact");
        self.rejected.push(err);
    }

    fn note_id(&mut self, id: i64) -> Option<NoteId> {
        match NoteId::try_from_raw(id) {
            Ok(id) => Some(id),
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    pub fn add_note(&mut self, id: i64, title: impl Into<String>, filename: impl Into<String>) {
        let Some(id) = self.note_id(id) else { return };
        match Note::new(id, title, filename) {
            Ok(note) => self.notes.push(note),
            Err(err) => self.reject(err),
        }
    }

    /// Route a raw link through the classifier
    pub fn add_raw_link(&mut self, src: &str, target: &str, title: &str) {
        if target.trim().is_empty() {
            match NoteId::parse(src) {
                Some(id) => {
                    self.empty_links.insert(id);
                }
                None => self.ignored_links += 1,
            }
            return;
        }
        match classify(src, target, title) {
            Some(Classified::Direct(link)) => self.links.push(link),
            Some(Classified::Sequence(declaration)) => self.add_declaration(declaration),
            None => {
                debug!(src, target, "ignoring link to another document");
                self.ignored_links += 1;
            }
        }
    }

    /// Expand a declaration into the owner's root alias, the declared alias
    /// and the sequence into it
    fn add_declaration(&mut self, declaration: Declaration) {
        let Declaration { alias, dest, owner } = declaration;
        if self.roots.insert(owner) {
            match Alias::new(owner, owner.root_alias()) {
                Ok(root) => self.aliases.push(root),
                Err(err) => self.reject(err),
            }
        }
        let sequence = parent_alias(&alias).map(|parent| Sequence::new(parent, alias.as_str()));
        match Alias::declared(dest, owner, alias) {
            Ok(declared) => self.aliases.push(declared),
            Err(err) => self.reject(err),
        }
        match sequence {
            Some(Ok(sequence)) => self.sequences.push(sequence),
            Some(Err(err)) => self.reject(err),
            None => {}
        }
    }

    pub fn add_tag(&mut self, id: i64, tag: impl Into<String>) {
        let Some(id) = self.note_id(id) else { return };
        match Tag::new(id, tag) {
            Ok(tag) => self.tags.push(tag),
            Err(err) => self.reject(err),
        }
    }

    pub fn add_citation(&mut self, id: i64, key: impl Into<String>) {
        let Some(id) = self.note_id(id) else { return };
        match Citation::new(id, key) {
            Ok(citation) => self.citations.push(citation),
            Err(err) => self.reject(err),
        }
    }

    pub fn add_reference(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.references.push(Reference::new(key, text));
    }

    /// Add an already typed fact
    pub fn push(&mut self, fact: impl Into<Fact>) {
        match fact.into() {
            Fact::Note(note) => self.notes.push(note),
            Fact::Link(link) => self.links.push(link),
            Fact::Alias(alias) => self.aliases.push(alias),
            Fact::Sequence(sequence) => self.sequences.push(sequence),
            Fact::Tag(tag) => self.tags.push(tag),
            Fact::Citation(citation) => self.citations.push(citation),
            Fact::Reference(reference) => self.references.push(reference),
        }
    }

    /// Replay the collected facts and freeze the result.
    ///
    /// Categories go in dependency order: notes, aliases, sequences, links,
    /// tags, citations, references. Nothing here aborts the build.
    pub fn build(self) -> Build {
        let mut report = BuildReport {
            ignored_links: self.ignored_links,
            rejected: self.rejected,
            ..Default::default()
        };
        let mut model = GraphModel::new();

        let facts = self
            .notes
            .into_iter()
            .map(Fact::Note)
            .chain(self.aliases.into_iter().map(Fact::Alias))
            .chain(self.sequences.into_iter().map(Fact::Sequence))
            .chain(self.links.into_iter().map(Fact::Link))
            .chain(self.tags.into_iter().map(Fact::Tag))
            .chain(self.citations.into_iter().map(Fact::Citation))
            .chain(self.references.into_iter().map(Fact::Reference));

        for fact in facts {
            report.facts += 1;
            let kind = fact.kind();
            match model.insert(fact) {
                Ok(Insertion::Applied) => report.applied += 1,
                Ok(Insertion::Unchanged | Insertion::Rejected(_)) => {}
                Ok(Insertion::Unresolved(err)) => {
                    debug!(kind, error = %err, "unresolved fact");
                    report.unresolved += 1;
                }
                Err(err) => {
                    warn!(kind, error = %err, "rejecting fact");
                    report.rejected.push(err);
                }
            }
        }

        for id in self.empty_links {
            if let Insertion::Unresolved(err) = model.mark_empty_link(id) {
                debug!(error = %err, "empty link on missing note");
            }
        }

        let (graph, warnings) = model.freeze();
        report.warnings = warnings;
        info!(
            facts = report.facts,
            applied = report.applied,
            unresolved = report.unresolved,
            rejected = report.rejected.len(),
            warnings = report.warnings.len(),
            "build finished"
        );
        Build { graph, report }
    }
}
