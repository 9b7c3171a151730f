//! Errors and warnings raised while building the graph

use super::node::NoteId;
use serde::Serialize;
use thiserror::Error;

/// A fact that is structurally invalid
///
/// Only the offending fact is rejected; the rest of the build proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("negative note ID: {0}")]
    NegativeNoteId(i64),

    #[error("note ID {0} is too large to store")]
    NoteIdOutOfRange(u64),

    #[error("empty title for note {0}")]
    EmptyTitle(NoteId),

    #[error("missing filename for note {0}")]
    EmptyFilename(NoteId),

    #[error("malformed alias: '{0}'")]
    MalformedAlias(String),

    #[error("root alias '{alias}' cannot name note {id}")]
    ForeignRootAlias { alias: String, id: NoteId },

    #[error("'{next}' does not follow '{prev}'")]
    NotSequential { prev: String, next: String },

    #[error("malformed tag: '{0}'")]
    MalformedTag(String),

    #[error("empty citation key in note {0}")]
    EmptyCitationKey(NoteId),
}

/// A valid fact that refers to something not (yet) in the graph
///
/// Returned as a value so callers can decide whether it matters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("{role} refers to missing note {id}")]
    MissingNote { role: &'static str, id: NoteId },

    #[error("unknown alias: '{0}'")]
    UnknownAlias(String),

    #[error("no citation uses key '{0}'")]
    UncitedKey(String),
}

/// A non-fatal conflict, reported at the end of a build or commit
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    #[error(
        "Duplicate ID: {id}. Note '{replaced_title}' in '{replaced_filename}' \
         was replaced by note '{title}' in '{filename}'."
    )]
    DuplicateNote {
        id: NoteId,
        title: String,
        filename: String,
        replaced_title: String,
        replaced_filename: String,
    },

    #[error(
        "Duplicate alias definition for '{alias}' used by note {existing}. \
         It will not be used as an alias for note {rejected}."
    )]
    DuplicateAlias {
        alias: String,
        existing: NoteId,
        rejected: NoteId,
    },

    #[error("Missing note alias: '{missing}'. Sequence '{prev}' -> '{next}' was not linked.")]
    DanglingSequence {
        prev: String,
        next: String,
        /// Whichever end was not in the build
        missing: String,
    },

    #[error(
        "Duplicate ID: {id}. Could not insert note '{title}'. \
         Note '{existing_title}' already uses the ID. See '{filename}' or '{existing_filename}'."
    )]
    NoteConflict {
        id: NoteId,
        title: String,
        filename: String,
        existing_title: String,
        existing_filename: String,
    },

    #[error("Missing note alias: '{prev}'. {}", unreachable_note(.note, .next))]
    MissingAlias {
        prev: String,
        next: String,
        note: Option<NoteId>,
    },

    #[error("Skipped row in {table}: {detail}")]
    RowSkipped { table: &'static str, detail: String },
}

fn unreachable_note(note: &Option<NoteId>, next: &str) -> String {
    match note {
        Some(id) => format!("Note {id} with alias '{next}' will be unreachable."),
        None => format!("Alias '{next}' is missing as well."),
    }
}
