//! Serialization tests with extractor-format fixtures

use serde_json::{json, Value};

/// Fixture: one line of each kind, as the note extractor writes them
fn extractor_fixtures() -> Vec<Value> {
    vec![
        json!({"kind": "note", "id": 12, "title": "Zettelkasten", "filename": "notes/index.md"}),
        json!({"kind": "link", "src": "12", "target": "#13", "title": "compare"}),
        json!({"kind": "link", "src": "12", "target": "#14", "title": "/a"}),
        json!({"kind": "tag", "id": 12, "tag": "#method"}),
        json!({"kind": "citation", "id": 12, "key": "luhmann1992"}),
        json!({"kind": "reference", "key": "luhmann1992", "text": "Kommunikation mit Zettelkästen"}),
    ]
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{
        edge::{Alias, Link},
        node::{Note, NoteId},
        store::RawFact,
    };

    #[test]
    fn note_id_serializes_as_integer() {
        let json = serde_json::to_string(&NoteId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn note_id_rejects_negative_json() {
        let result: Result<NoteId, _> = serde_json::from_str("-3");
        assert!(result.is_err());
    }

    #[test]
    fn every_fixture_kind_parses() {
        let facts: Vec<RawFact> = extractor_fixtures()
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap())
            .collect();
        assert_eq!(facts.len(), 6);
        assert!(matches!(facts[0], RawFact::Note { id: 12, .. }));
        assert!(matches!(&facts[2], RawFact::Link { title, .. } if title == "/a"));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let result: Result<RawFact, _> =
            serde_json::from_value(json!({"kind": "figure", "id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn raw_fact_serializes_with_kind_tag() {
        let raw = RawFact::Tag {
            id: 3,
            tag: "#draft".to_string(),
        };
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json, json!({"kind": "tag", "id": 3, "tag": "#draft"}));
    }

    #[test]
    fn note_field_names() {
        let note = Note::new(5u64, "Title", "a.md").unwrap();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json, json!({"id": 5, "title": "Title", "filename": "a.md"}));
    }

    #[test]
    fn link_description_is_kept_when_empty() {
        let link = Link::new(1u64, 2u64, "");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["description"], "");
        assert_eq!(json["src"], 1);
        assert_eq!(json["dest"], 2);
    }

    #[test]
    fn alias_roundtrip() {
        let alias = Alias::declared(9u64, 4u64, "4b2").unwrap();
        let json = serde_json::to_string(&alias).unwrap();
        let back: Alias = serde_json::from_str(&json).unwrap();
        assert_eq!(alias, back);
    }
}
