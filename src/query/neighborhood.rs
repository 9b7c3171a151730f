//! Tag clusters and local neighbourhoods, as renderable elements

use super::types::{Direction, EdgeKind, ElementEdge, Elements};
use super::walk::EdgeWalk;
use crate::graph::{Graph, NoteId};
use std::collections::BTreeSet;

/// All sequence edges between notes sharing one tag
#[derive(Debug, Clone)]
pub struct ClusterQuery {
    pub tag: String,
}

impl ClusterQuery {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Walk the cluster from its roots, then from whatever a cycle left
    /// unreached. Self-loops are dropped.
    pub fn execute<'g>(&self, graph: &'g Graph) -> Elements<'g> {
        let Some((tag, cluster)) = graph.cluster_entry(&self.tag) else {
            return Elements::default();
        };

        let mut members = BTreeSet::new();
        let mut sources = Vec::new();
        for (src, dest) in cluster.edges() {
            members.insert(src);
            members.insert(dest);
            if sources.last() != Some(&src) {
                sources.push(src);
            }
        }
        // Stable: roots first, each group ordered by id
        sources.sort_by_key(|id| !cluster.incoming(*id).is_empty());

        let mut walk = EdgeWalk::new(cluster, Direction::Outgoing);
        let edges = sources
            .into_iter()
            .flat_map(|start| walk.walk_from(start))
            .map(|(src, dest)| ElementEdge {
                src,
                dest,
                kind: EdgeKind::Sequence,
                tag: Some(tag),
            })
            .collect();

        Elements {
            center: None,
            nodes: members.into_iter().filter_map(|id| graph.note(id)).collect(),
            edges,
        }
    }
}

/// Same-tag chains through a note, plus its direct links
#[derive(Debug, Clone)]
pub struct NeighborQuery {
    /// Note to expand around
    pub origin: NoteId,
    /// Which way to follow chains and links
    pub direction: Direction,
}

impl NeighborQuery {
    pub fn around(origin: NoteId) -> Self {
        Self {
            origin,
            direction: Direction::Both,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    fn follows(&self, direction: Direction) -> bool {
        self.direction == Direction::Both || self.direction == direction
    }

    pub fn execute<'g>(&self, graph: &'g Graph) -> Elements<'g> {
        let Some(record) = graph.record(self.origin) else {
            return Elements::default();
        };

        let mut members = BTreeSet::from([self.origin]);
        let mut edges: Vec<ElementEdge<'g>> = Vec::new();
        let mut add = |edge: ElementEdge<'g>| {
            if edge.src == edge.dest || edges.contains(&edge) {
                return;
            }
            members.insert(edge.src);
            members.insert(edge.dest);
            edges.push(edge);
        };

        for tag in &record.tags {
            let Some((tag, cluster)) = graph.cluster_entry(tag) else {
                continue;
            };
            for direction in [Direction::Incoming, Direction::Outgoing] {
                if !self.follows(direction) {
                    continue;
                }
                // Each direction keeps its own visited set
                let mut walk = EdgeWalk::new(cluster, direction);
                for (src, dest) in walk.walk_from(self.origin) {
                    add(ElementEdge {
                        src,
                        dest,
                        kind: EdgeKind::Sequence,
                        tag: Some(tag),
                    });
                }
            }
        }

        let links = graph.links();
        let mut incident = Vec::new();
        if self.follows(Direction::Outgoing) {
            incident.extend(record.links.iter().filter_map(|index| links.get(*index)));
        }
        if self.follows(Direction::Incoming) {
            incident.extend(record.backlinks.iter().filter_map(|index| links.get(*index)));
        }
        for link in incident {
            add(ElementEdge {
                src: link.src,
                dest: link.dest,
                kind: EdgeKind::Link,
                tag: None,
            });
        }

        Elements {
            center: Some(self.origin),
            nodes: members.into_iter().filter_map(|id| graph.note(id)).collect(),
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Alias, GraphModel, Link, Note, Sequence, Tag};

    fn id(n: u64) -> NoteId {
        NoteId::new(n)
    }

    /// Diamond inside tag "#d": note 1 owns "1" and reaches note 4 through
    /// both note 2 and note 3, because note 4 owns "1a1" and "1b1".
    fn create_diamond() -> Graph {
        let mut model = GraphModel::new();
        for n in 1u64..=5 {
            model.insert(Note::new(n, format!("Note {n}"), "d.md").unwrap()).unwrap();
        }
        model.insert(Alias::new(1u64, "1").unwrap()).unwrap();
        model.insert(Alias::declared(2u64, 1u64, "1a").unwrap()).unwrap();
        model.insert(Alias::declared(3u64, 1u64, "1b").unwrap()).unwrap();
        model.insert(Alias::declared(4u64, 2u64, "1a1").unwrap()).unwrap();
        model.insert(Alias::declared(4u64, 3u64, "1b1").unwrap()).unwrap();
        for (prev, next) in [("1", "1a"), ("1", "1b"), ("1a", "1a1"), ("1b", "1b1")] {
            model.insert(Sequence::new(prev, next).unwrap()).unwrap();
        }
        for n in 1u64..=4 {
            model.insert(Tag::new(n, "#d").unwrap()).unwrap();
        }
        model.insert(Link::new(5u64, 2u64, "see")).unwrap();
        model.insert(Link::new(2u64, 2u64, "")).unwrap();
        model.freeze().0
    }

    #[test]
    fn test_cluster_diamond_visits_each_edge_once() {
        let graph = create_diamond();
        let elements = ClusterQuery::tag("#d").execute(&graph);

        assert_eq!(elements.edges.len(), 4);
        for (src, dest) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            assert!(elements.contains_edge(id(src), id(dest)));
        }
        assert_eq!(elements.nodes.len(), 4);
        assert!(!elements.contains_node(id(5)));
        assert!(elements.edges.iter().all(|edge| edge.tag == Some("#d")));
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let graph = create_diamond();
        assert!(ClusterQuery::tag("#none").execute(&graph).is_empty());
    }

    #[test]
    fn test_neighbors_follow_chains_both_ways() {
        let graph = create_diamond();
        let elements = NeighborQuery::around(id(2)).execute(&graph);

        assert_eq!(elements.center, Some(id(2)));
        assert!(elements.contains_edge(id(1), id(2)));
        assert!(elements.contains_edge(id(2), id(4)));
        assert!(elements.contains_edge(id(5), id(2)));
        // Self-link is not an element edge
        assert!(!elements.contains_edge(id(2), id(2)));
        // Sibling branch 1 -> 3 -> 4 is not on a chain through 2
        assert!(!elements.contains_node(id(3)));
    }

    #[test]
    fn test_neighbors_outgoing_only() {
        let graph = create_diamond();
        let elements = NeighborQuery::around(id(1))
            .direction(Direction::Outgoing)
            .execute(&graph);

        assert_eq!(elements.edges.len(), 4);
        assert!(!elements.contains_node(id(5)));
    }

    #[test]
    fn test_missing_note_has_no_neighbors() {
        let graph = create_diamond();
        let elements = NeighborQuery::around(id(99)).execute(&graph);
        assert!(elements.is_empty());
        assert!(elements.center.is_none());
    }
}
