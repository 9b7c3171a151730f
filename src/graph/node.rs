//! Note representation in the graph

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Identifier of a note
///
/// Externally assigned (it is the number in the note's heading), so it is
/// never generated here. Serializes as a plain integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(u64);

impl NoteId {
    /// Largest id the SQLite sink can store
    pub const MAX: NoteId = NoteId(i64::MAX as u64);

    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Parse a digits-only string, e.g. the identifier of a note section.
    pub fn parse(text: &str) -> Option<Self> {
        if !crate::classify::is_digits(text) {
            return None;
        }
        text.parse().ok().map(Self).filter(|id| *id <= Self::MAX)
    }

    /// Convert a signed id from raw input
    pub fn try_from_raw(id: i64) -> Result<Self, DomainError> {
        u64::try_from(id)
            .map(Self)
            .map_err(|_| DomainError::NegativeNoteId(id))
    }

    /// Get the inner value
    pub fn get(self) -> u64 {
        self.0
    }

    /// The root alias every note implicitly answers to
    pub fn root_alias(self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NoteId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A note as supplied by the producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Source file the note was extracted from
    pub filename: String,
}

impl Note {
    /// Create a validated note
    pub fn new(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let note = Self {
            id: id.into(),
            title: title.into(),
            filename: filename.into(),
        };
        note.validate()?;
        Ok(note)
    }

    /// Check the id range and the non-empty title/filename invariants
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id > NoteId::MAX {
            return Err(DomainError::NoteIdOutOfRange(self.id.get()));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::EmptyTitle(self.id));
        }
        if self.filename.trim().is_empty() {
            return Err(DomainError::EmptyFilename(self.id));
        }
        Ok(())
    }
}

/// A note inside the graph model, with its adjacency
#[derive(Debug, Clone, Default)]
pub(crate) struct NoteRecord {
    pub title: String,
    pub filename: String,
    /// Indices into the model's link list, outgoing
    pub links: Vec<usize>,
    /// Indices into the model's link list, incoming
    pub backlinks: Vec<usize>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub citations: Vec<String>,
    /// Set when the source contained a link with an empty target
    pub has_empty_link: bool,
    /// Link targets that are not notes of this build
    pub broken_links: Vec<NoteId>,
}

impl NoteRecord {
    pub fn new(title: String, filename: String) -> Self {
        Self {
            title,
            filename,
            ..Default::default()
        }
    }
}

/// Borrowed, plain-data view of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteRef<'g> {
    pub id: NoteId,
    pub title: &'g str,
    pub filename: &'g str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert_eq!(NoteId::parse("042"), Some(NoteId::new(42)));
        assert_eq!(NoteId::parse("4a"), None);
        assert_eq!(NoteId::parse(""), None);
    }

    #[test]
    fn test_parse_rejects_ids_past_max() {
        assert_eq!(NoteId::parse("9223372036854775807"), Some(NoteId::MAX));
        assert_eq!(NoteId::parse("9223372036854775808"), None);
        assert_eq!(NoteId::parse("18446744073709551615"), None);
    }

    #[test]
    fn test_note_rejects_id_past_max() {
        assert_eq!(
            Note::new(u64::MAX, "Huge", "a.md"),
            Err(DomainError::NoteIdOutOfRange(u64::MAX))
        );
        assert!(Note::new(NoteId::MAX, "Largest", "a.md").is_ok());
    }

    #[test]
    fn test_negative_raw_id() {
        assert_eq!(
            NoteId::try_from_raw(-1),
            Err(DomainError::NegativeNoteId(-1))
        );
    }
}
