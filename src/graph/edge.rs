//! Relations between notes: links, aliases, sequences, tags and citations

use super::error::DomainError;
use super::node::NoteId;
use crate::classify::{is_alias, is_root_alias, is_sequence};
use serde::{Deserialize, Serialize};

/// A direct link between two notes
///
/// The same record serves as the forward link on `src` and as the backlink
/// on `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub src: NoteId,
    pub dest: NoteId,
    /// Link title; empty when the link carries no annotation
    pub description: String,
}

impl Link {
    pub fn new(src: impl Into<NoteId>, dest: impl Into<NoteId>, description: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            description: description.into(),
        }
    }

    pub fn is_self_link(&self) -> bool {
        self.src == self.dest
    }
}

/// An alias claimed by a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Note the alias denotes
    pub id: NoteId,
    /// Note that declared the alias
    pub owner: NoteId,
    pub alias: String,
}

impl Alias {
    /// Alias declared by the note it denotes
    pub fn new(id: impl Into<NoteId>, alias: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        Self::declared(id, id, alias)
    }

    /// Alias for `id` declared in the body of `owner`
    pub fn declared(
        id: impl Into<NoteId>,
        owner: impl Into<NoteId>,
        alias: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let alias = Self {
            id: id.into(),
            owner: owner.into(),
            alias: alias.into(),
        };
        alias.validate()?;
        Ok(alias)
    }

    /// Grammar check, plus: a root alias can only name its own note
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_alias(&self.alias) {
            return Err(DomainError::MalformedAlias(self.alias.clone()));
        }
        if is_root_alias(&self.alias) && self.alias != self.id.root_alias() {
            return Err(DomainError::ForeignRootAlias {
                alias: self.alias.clone(),
                id: self.id,
            });
        }
        Ok(())
    }
}

/// An alias inside the graph model, with its place in the hierarchy
#[derive(Debug, Clone)]
pub(crate) struct AliasRecord {
    pub id: NoteId,
    pub owner: NoteId,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

/// A parent-child edge between two aliases
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub prev: String,
    pub next: String,
}

impl Sequence {
    pub fn new(prev: impl Into<String>, next: impl Into<String>) -> Result<Self, DomainError> {
        let sequence = Self {
            prev: prev.into(),
            next: next.into(),
        };
        sequence.validate()?;
        Ok(sequence)
    }

    /// Both ends must be aliases and `next` must derive from `prev`
    pub fn validate(&self) -> Result<(), DomainError> {
        for alias in [&self.prev, &self.next] {
            if !is_alias(alias) {
                return Err(DomainError::MalformedAlias(alias.clone()));
            }
        }
        if !is_sequence(&self.prev, &self.next) {
            return Err(DomainError::NotSequential {
                prev: self.prev.clone(),
                next: self.next.clone(),
            });
        }
        Ok(())
    }
}

/// A hashtag attached to a note
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: NoteId,
    pub tag: String,
}

impl Tag {
    pub fn new(id: impl Into<NoteId>, tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = Self {
            id: id.into(),
            tag: tag.into(),
        };
        tag.validate()?;
        Ok(tag)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let rest = self.tag.strip_prefix('#').unwrap_or("");
        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return Err(DomainError::MalformedTag(self.tag.clone()));
        }
        Ok(())
    }
}

/// A citation of a bibliography entry by a note
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub id: NoteId,
    pub key: String,
}

impl Citation {
    pub fn new(id: impl Into<NoteId>, key: impl Into<String>) -> Result<Self, DomainError> {
        let citation = Self {
            id: id.into(),
            key: key.into(),
        };
        citation.validate()?;
        Ok(citation)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.key.trim().is_empty() {
            return Err(DomainError::EmptyCitationKey(self.id));
        }
        Ok(())
    }
}

/// Bibliography text for a cited key, supplied after the citations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub key: String,
    pub text: String,
}

impl Reference {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}
