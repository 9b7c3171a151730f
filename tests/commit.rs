//! Committing built graphs to an on-disk SQLite database

mod common;

use common::{build_from, note, slipbox_facts};
use slipgraph::{
    DomainError, GraphModel, GraphSink, Note, NoteId, OpenStore, SqliteStore, Warning,
};
use slipgraph::storage::Table;

fn create_test_db() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("slipgraph.db");
    (dir, path)
}

#[test]
fn test_commit_slipbox() {
    let (_dir, path) = create_test_db();
    let store = SqliteStore::open(&path).unwrap();
    let build = build_from(slipbox_facts());

    let report = store.commit(&build.graph).unwrap();
    assert_eq!(report.inserted(Table::Notes), 7);
    assert_eq!(report.inserted(Table::Links), 3);
    assert_eq!(report.inserted(Table::Sequences), 3);
    assert_eq!(store.count_rows(Table::Files).unwrap(), 2);
    assert_eq!(store.count_rows(Table::Citations).unwrap(), 1);

    // The sequence into "7x1" has no parent alias to attach to
    assert_eq!(
        report.warnings,
        vec![Warning::MissingAlias {
            prev: "7x".to_string(),
            next: "7x1".to_string(),
            note: Some(NoteId::new(6)),
        }]
    );
}

#[test]
fn test_reopened_database_keeps_rows() {
    let (_dir, path) = create_test_db();
    {
        let store = SqliteStore::open(&path).unwrap();
        store.commit(&build_from(slipbox_facts()).graph).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let origin = store.load_note(NoteId::new(1)).unwrap().unwrap();
    assert_eq!(origin.title, "Origin");
    assert_eq!(store.load_links_from(NoteId::new(4)).unwrap().len(), 1);
    assert_eq!(store.load_sequences().unwrap().len(), 3);
}

#[test]
fn test_second_commit_reports_no_note_warnings() {
    let (_dir, path) = create_test_db();
    let store = SqliteStore::open(&path).unwrap();
    let build = build_from(slipbox_facts());
    store.commit(&build.graph).unwrap();

    let report = store.commit(&build.graph).unwrap();
    assert_eq!(report.inserted(Table::Notes), 0);
    assert!(report
        .warnings
        .iter()
        .all(|warning| !matches!(warning, Warning::NoteConflict { .. })));
    assert_eq!(store.count_rows(Table::Notes).unwrap(), 7);
}

#[test]
fn test_renamed_note_conflicts() {
    let (_dir, path) = create_test_db();
    let store = SqliteStore::open(&path).unwrap();
    store.commit(&build_from(slipbox_facts()).graph).unwrap();

    let renamed = build_from([note(5, "Tightened", "misc.md")]);
    let report = store.commit(&renamed.graph).unwrap();
    assert!(matches!(
        &report.warnings[..],
        [Warning::NoteConflict { id, title, existing_title, .. }]
            if *id == NoteId::new(5) && title == "Tightened" && existing_title == "Loose"
    ));
}

#[test]
fn test_oversized_id_is_rejected_before_commit() {
    let (_dir, path) = create_test_db();
    let store = SqliteStore::open(&path).unwrap();

    let mut model = GraphModel::new();
    model.insert(Note::new(1u64, "One", "a.md").unwrap()).unwrap();
    let huge = Note {
        id: NoteId::new(u64::MAX),
        title: "Huge".to_string(),
        filename: "a.md".to_string(),
    };
    assert_eq!(
        model.insert(huge),
        Err(DomainError::NoteIdOutOfRange(u64::MAX))
    );
    model.insert(Note::new(NoteId::MAX, "Largest", "a.md").unwrap()).unwrap();
    let (graph, _) = model.freeze();

    let report = store.commit(&graph).unwrap();
    assert_eq!(report.inserted(Table::Notes), 2);
    assert_eq!(
        store.load_note(NoteId::MAX).unwrap().unwrap().title,
        "Largest"
    );
}
