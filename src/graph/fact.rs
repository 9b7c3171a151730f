//! Typed facts and their insertion into the graph model

use super::edge::{Alias, Citation, Link, Reference, Sequence, Tag};
use super::error::{DomainError, ReferenceError, Warning};
use super::model::GraphModel;
use super::node::Note;

/// One validated-on-insert unit of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Note(Note),
    Link(Link),
    Alias(Alias),
    Sequence(Sequence),
    Tag(Tag),
    Citation(Citation),
    Reference(Reference),
}

/// What happened to a fact that passed structural validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The model changed
    Applied,
    /// The fact repeated something already in the model
    Unchanged,
    /// The fact refers to a note or alias that is not in the model
    Unresolved(ReferenceError),
    /// The fact conflicts with an earlier one, which wins
    Rejected(Warning),
}

impl Fact {
    /// Validate and apply this fact to `model`.
    ///
    /// Structural problems are errors. Missing referents and conflicts are
    /// reported through the returned [`Insertion`].
    pub fn add_to(self, model: &mut GraphModel) -> Result<Insertion, DomainError> {
        match self {
            Fact::Note(note) => model.add_note(note),
            Fact::Link(link) => Ok(model.add_link(link)),
            Fact::Alias(alias) => model.add_alias(alias),
            Fact::Sequence(sequence) => model.add_sequence(sequence),
            Fact::Tag(tag) => model.add_tag(tag),
            Fact::Citation(citation) => model.add_citation(citation),
            Fact::Reference(reference) => Ok(model.add_reference(reference)),
        }
    }

    /// Short category name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Fact::Note(_) => "note",
            Fact::Link(_) => "link",
            Fact::Alias(_) => "alias",
            Fact::Sequence(_) => "sequence",
            Fact::Tag(_) => "tag",
            Fact::Citation(_) => "citation",
            Fact::Reference(_) => "reference",
        }
    }
}

macro_rules! impl_from_fact {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Fact {
                fn from(value: $variant) -> Self {
                    Fact::$variant(value)
                }
            }
        )*
    };
}

impl_from_fact!(Note, Link, Alias, Sequence, Tag, Citation, Reference);
