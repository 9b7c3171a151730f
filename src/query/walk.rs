//! Visited-edge depth-first walk over note adjacency
//!
//! Tag clusters and neighbourhoods can contain diamonds and cycles, so every
//! traversal over them goes through [`EdgeWalk`], which visits each edge at
//! most once and never follows a self-loop.

use super::types::Direction;
use crate::graph::{Adjacency, NoteId};
use std::collections::HashSet;

/// Depth-first walk that remembers visited edges across calls
#[derive(Debug)]
pub struct EdgeWalk<'a> {
    adjacency: &'a Adjacency,
    direction: Direction,
    visited: HashSet<(NoteId, NoteId)>,
}

impl<'a> EdgeWalk<'a> {
    pub fn new(adjacency: &'a Adjacency, direction: Direction) -> Self {
        Self {
            adjacency,
            direction,
            visited: HashSet::new(),
        }
    }

    /// Walk from `start`; returns the edges not seen by earlier calls, in
    /// visit order. Edges keep the orientation they have in the adjacency.
    pub fn walk_from(&mut self, start: NoteId) -> Vec<(NoteId, NoteId)> {
        let mut found = Vec::new();
        let mut stack = Vec::new();
        self.push_edges(start, &mut stack);

        while let Some(edge) = stack.pop() {
            let (src, dest) = edge;
            if src == dest || !self.visited.insert(edge) {
                continue;
            }
            found.push(edge);
            match self.direction {
                Direction::Outgoing => self.push_outgoing(dest, &mut stack),
                Direction::Incoming => self.push_incoming(src, &mut stack),
                Direction::Both => {
                    self.push_edges(src, &mut stack);
                    self.push_edges(dest, &mut stack);
                }
            }
        }
        found
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    fn push_edges(&self, id: NoteId, stack: &mut Vec<(NoteId, NoteId)>) {
        match self.direction {
            Direction::Outgoing => self.push_outgoing(id, stack),
            Direction::Incoming => self.push_incoming(id, stack),
            Direction::Both => {
                self.push_outgoing(id, stack);
                self.push_incoming(id, stack);
            }
        }
    }

    // Reverse push so the first listed edge is visited first
    fn push_outgoing(&self, id: NoteId, stack: &mut Vec<(NoteId, NoteId)>) {
        stack.extend(self.adjacency.outgoing(id).iter().rev().map(|dest| (id, *dest)));
    }

    fn push_incoming(&self, id: NoteId, stack: &mut Vec<(NoteId, NoteId)>) {
        stack.extend(self.adjacency.incoming(id).iter().rev().map(|src| (*src, id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> NoteId {
        NoteId::new(n)
    }

    fn adjacency(edges: &[(u64, u64)]) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for (src, dest) in edges {
            adjacency.add(id(*src), id(*dest));
        }
        adjacency
    }

    #[test]
    fn test_diamond_visits_each_edge_once() {
        // 1 -> 2 -> 4
        //  \-> 3 -/
        let graph = adjacency(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Outgoing);
        let edges = walk.walk_from(id(1));

        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], (id(1), id(2)));
        assert_eq!(walk.visited(), 4);
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = adjacency(&[(1, 2), (2, 3), (3, 1)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Outgoing);
        assert_eq!(walk.walk_from(id(2)).len(), 3);
    }

    #[test]
    fn test_self_loop_is_skipped() {
        let graph = adjacency(&[(1, 1), (1, 2)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Outgoing);
        assert_eq!(walk.walk_from(id(1)), vec![(id(1), id(2))]);
    }

    #[test]
    fn test_incoming_keeps_orientation() {
        let graph = adjacency(&[(1, 2), (2, 3)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Incoming);
        assert_eq!(walk.walk_from(id(3)), vec![(id(2), id(3)), (id(1), id(2))]);
    }

    #[test]
    fn test_second_walk_only_reports_new_edges() {
        let graph = adjacency(&[(1, 2), (3, 2), (2, 4)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Outgoing);
        assert_eq!(walk.walk_from(id(1)).len(), 2);
        assert_eq!(walk.walk_from(id(3)), vec![(id(3), id(2))]);
    }

    #[test]
    fn test_both_directions_cover_component() {
        let graph = adjacency(&[(1, 2), (3, 2), (3, 4)]);
        let mut walk = EdgeWalk::new(&graph, Direction::Both);
        assert_eq!(walk.walk_from(id(4)).len(), 3);
    }
}
