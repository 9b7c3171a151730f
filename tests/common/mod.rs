//! Shared fixtures for the integration tests
//!
//! `slipbox_facts` is a small slipbox as the note extractor would emit it:
//!
//! ```text
//! 1 Origin    links to 3; declares 1a -> 2, 1a1 -> 3, 1b -> 4   #stats
//! 2 Branch                                                      #stats
//! 3 Leaf      cites doe2020                                     #stats
//! 4 Sibling   links to 5, plus an empty link
//! 5 Loose     links to 3
//! 6 Stray     target of 7x1, whose parent 7x is never declared
//! 7 Declarer
//! ```

#![allow(dead_code)]

use slipgraph::{Build, FactStore, RawFact};

pub fn note(id: i64, title: &str, filename: &str) -> RawFact {
    RawFact::Note {
        id,
        title: title.to_string(),
        filename: filename.to_string(),
    }
}

pub fn link(src: &str, target: &str, title: &str) -> RawFact {
    RawFact::Link {
        src: src.to_string(),
        target: target.to_string(),
        title: title.to_string(),
    }
}

pub fn tag(id: i64, tag: &str) -> RawFact {
    RawFact::Tag {
        id,
        tag: tag.to_string(),
    }
}

pub fn citation(id: i64, key: &str) -> RawFact {
    RawFact::Citation {
        id,
        key: key.to_string(),
    }
}

pub fn reference(key: &str, text: &str) -> RawFact {
    RawFact::Reference {
        key: key.to_string(),
        text: text.to_string(),
    }
}

pub fn slipbox_facts() -> Vec<RawFact> {
    vec![
        note(1, "Origin", "stats.md"),
        note(2, "Branch", "stats.md"),
        note(3, "Leaf", "stats.md"),
        note(4, "Sibling", "misc.md"),
        note(5, "Loose", "misc.md"),
        note(6, "Stray", "misc.md"),
        note(7, "Declarer", "misc.md"),
        link("1", "#3", "see also"),
        link("5", "#3", ""),
        link("4", "", "todo"),
        link("4", "#5", ""),
        link("1", "#2", "/a"),
        link("1", "#3", "/a1"),
        link("1", "#4", "/b"),
        link("7", "#6", "/x1"),
        link("2", "other.md#9", ""),
        tag(1, "#stats"),
        tag(2, "#stats"),
        tag(3, "#stats"),
        citation(3, "doe2020"),
        reference("doe2020", "Doe, J. (2020). Counting things."),
    ]
}

/// Collect `facts` in the given order and build
pub fn build_from(facts: impl IntoIterator<Item = RawFact>) -> Build {
    let mut store = FactStore::new();
    for fact in facts {
        store.collect(fact);
    }
    store.build()
}

/// One fact per line, as the extractor writes them
pub fn to_jsonl(facts: &[RawFact]) -> String {
    facts
        .iter()
        .map(|fact| serde_json::to_string(fact).unwrap() + "\n")
        .collect()
}
