//! Walks along the alias hierarchy
//!
//! The parent chain is acyclic by construction (a parent alias is always a
//! strict prefix of its child), so [`ancestors`] uses a bounded walk that
//! panics if that ever stops being true.

use super::types::{AliasEntry, Ancestor, Descendant};
use crate::graph::Graph;
use std::collections::{HashSet, VecDeque};

fn entry<'g>(graph: &'g Graph, alias: &str) -> Option<AliasEntry<'g>> {
    let (alias, record) = graph.alias_entry(alias)?;
    Some(AliasEntry {
        note: graph.note(record.id)?,
        alias,
    })
}

/// Parent of `alias`, if it has one
pub fn parent<'g>(graph: &'g Graph, alias: &str) -> Option<AliasEntry<'g>> {
    let parent = graph.alias(alias)?.parent.as_deref()?;
    entry(graph, parent)
}

/// Direct children of `alias`, in the order their sequences were applied
pub fn children<'g>(graph: &'g Graph, alias: &str) -> impl Iterator<Item = AliasEntry<'g>> + 'g {
    graph
        .alias(alias)
        .into_iter()
        .flat_map(|record| record.children.iter())
        .filter_map(move |child| entry(graph, child))
}

/// Every alias above `alias`, nearest first
pub fn ancestors<'g>(graph: &'g Graph, alias: &str) -> Vec<Ancestor<'g>> {
    let mut result = Vec::new();
    let Some((mut child_alias, mut child)) = graph.alias_entry(alias) else {
        return result;
    };

    let limit = graph.alias_count();
    while let Some(parent) = child.parent.as_deref() {
        assert!(
            result.len() < limit,
            "cycle in alias hierarchy above '{alias}'"
        );
        let Some((parent_alias, parent_record)) = graph.alias_entry(parent) else {
            break;
        };
        let Some(note) = graph.note(parent_record.id) else {
            break;
        };
        result.push(Ancestor {
            note,
            alias: parent_alias,
            child_alias,
            child_id: child.id,
        });
        child_alias = parent_alias;
        child = parent_record;
    }
    result
}

/// Every strict descendant of `alias`, breadth first
pub fn descendants<'g>(graph: &'g Graph, alias: &str) -> Vec<Descendant<'g>> {
    let mut result = Vec::new();
    let Some((start, _)) = graph.alias_entry(alias) else {
        return result;
    };

    let mut seen: HashSet<&'g str> = HashSet::from([start]);
    let mut queue: VecDeque<&'g str> = VecDeque::from([start]);
    while let Some(parent_alias) = queue.pop_front() {
        let Some(parent) = graph.alias(parent_alias) else {
            continue;
        };
        for child in &parent.children {
            let child = child.as_str();
            if !seen.insert(child) {
                continue;
            }
            let Some(child_entry) = entry(graph, child) else {
                continue;
            };
            result.push(Descendant {
                note: child_entry.note,
                alias: child_entry.alias,
                parent_alias,
                parent_id: parent.id,
            });
            queue.push_back(child);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Alias, GraphModel, Note, NoteId, Sequence};

    /// Aliases "0" (note 0), "0a" (note 1), "0a1" (note 2), "0b" (note 3)
    fn create_test_graph() -> Graph {
        let mut model = GraphModel::new();
        for id in 0u64..4 {
            model.insert(Note::new(id, format!("Note {id}"), "a.md").unwrap()).unwrap();
        }
        model.insert(Alias::new(0u64, "0").unwrap()).unwrap();
        model.insert(Alias::declared(1u64, 0u64, "0a").unwrap()).unwrap();
        model.insert(Alias::declared(2u64, 1u64, "0a1").unwrap()).unwrap();
        model.insert(Alias::declared(3u64, 0u64, "0b").unwrap()).unwrap();
        for (prev, next) in [("0", "0a"), ("0a", "0a1"), ("0", "0b")] {
            model.insert(Sequence::new(prev, next).unwrap()).unwrap();
        }
        model.freeze().0
    }

    #[test]
    fn test_parent() {
        let graph = create_test_graph();
        let up = parent(&graph, "0a1").unwrap();
        assert_eq!(up.alias, "0a");
        assert_eq!(up.note.id, NoteId::new(1));
        assert!(parent(&graph, "0").is_none());
        assert!(parent(&graph, "9z").is_none());
    }

    #[test]
    fn test_children_in_sequence_order() {
        let graph = create_test_graph();
        let aliases: Vec<_> = children(&graph, "0").map(|child| child.alias).collect();
        assert_eq!(aliases, vec!["0a", "0b"]);
        assert_eq!(children(&graph, "missing").count(), 0);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let graph = create_test_graph();
        let chain = ancestors(&graph, "0a1");
        let aliases: Vec<_> = chain.iter().map(|hop| hop.alias).collect();
        assert_eq!(aliases, vec!["0a", "0"]);

        assert_eq!(chain[0].child_alias, "0a1");
        assert_eq!(chain[0].child_id, NoteId::new(2));
        assert_eq!(chain[1].child_alias, "0a");
        assert_eq!(chain[1].note.id, NoteId::new(0));
    }

    #[test]
    fn test_descendants_breadth_first() {
        let graph = create_test_graph();
        let found = descendants(&graph, "0");
        let aliases: Vec<_> = found.iter().map(|d| d.alias).collect();
        assert_eq!(aliases, vec!["0a", "0b", "0a1"]);

        let deepest = &found[2];
        assert_eq!(deepest.parent_alias, "0a");
        assert_eq!(deepest.parent_id, NoteId::new(1));
    }

    #[test]
    fn test_leaf_has_no_descendants() {
        let graph = create_test_graph();
        assert!(descendants(&graph, "0a1").is_empty());
        assert!(descendants(&graph, "nope").is_empty());
    }
}
