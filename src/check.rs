//! Lint checks over a frozen graph

use crate::graph::{Graph, NoteId, NoteRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub empty_links: bool,
    /// Links to notes missing from the build
    pub invalid_links: bool,
    pub isolated_notes: bool,
    /// Off by default; only meaningful for a slipbox with a bibliography
    pub unsourced_notes: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            empty_links: true,
            invalid_links: true,
            isolated_notes: true,
            unsourced_notes: false,
        }
    }
}

/// A note a check flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "value", rename_all = "kebab-case")]
pub enum Finding<'g> {
    /// The note contains a link with an empty target
    EmptyLinkTarget(NoteRef<'g>),
    /// The note links to an id that is not in the build
    InvalidLink { note: NoteRef<'g>, target: NoteId },
    /// No direct links in either direction
    IsolatedNote(NoteRef<'g>),
    /// No citations
    #[serde(rename = "missing-citations")]
    UnsourcedNote(NoteRef<'g>),
}

impl<'g> Finding<'g> {
    pub fn note(&self) -> NoteRef<'g> {
        match *self {
            Finding::EmptyLinkTarget(note)
            | Finding::InvalidLink { note, .. }
            | Finding::IsolatedNote(note)
            | Finding::UnsourcedNote(note) => note,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Finding::EmptyLinkTarget(_) => "empty-link-target",
            Finding::InvalidLink { .. } => "invalid-link",
            Finding::IsolatedNote(_) => "isolated-note",
            Finding::UnsourcedNote(_) => "missing-citations",
        }
    }
}

impl fmt::Display for Finding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let note = self.note();
        write!(
            f,
            "{}: {} '{}' in {}",
            self.name(),
            note.id,
            note.title,
            note.filename
        )?;
        if let Finding::InvalidLink { target, .. } = self {
            write!(f, " links to missing note {target}")?;
        }
        Ok(())
    }
}

/// Run the enabled checks. Findings are grouped by check, each group ordered
/// by note id.
pub fn run<'g>(graph: &'g Graph, config: &CheckConfig) -> Vec<Finding<'g>> {
    let mut findings = Vec::new();
    let notes = move || {
        graph
            .records()
            .filter_map(move |(id, record)| Some((graph.note(id)?, record)))
    };

    if config.empty_links {
        findings.extend(
            notes()
                .filter(|(_, record)| record.has_empty_link)
                .map(|(note, _)| Finding::EmptyLinkTarget(note)),
        );
    }

    if config.invalid_links {
        findings.extend(notes().flat_map(|(note, record)| {
            record
                .broken_links
                .iter()
                .map(move |target| Finding::InvalidLink {
                    note,
                    target: *target,
                })
        }));
    }

    if config.isolated_notes {
        let links = graph.links();
        let connected = |indices: &[usize]| {
            indices
                .iter()
                .filter_map(|index| links.get(*index))
                .any(|link| !link.is_self_link())
        };
        findings.extend(
            notes()
                .filter(|(_, record)| {
                    !connected(record.links.as_slice()) && !connected(record.backlinks.as_slice())
                })
                .map(|(note, _)| Finding::IsolatedNote(note)),
        );
    }

    if config.unsourced_notes {
        findings.extend(
            notes()
                .filter(|(_, record)| record.citations.is_empty())
                .map(|(note, _)| Finding::UnsourcedNote(note)),
        );
    }

    findings
}
