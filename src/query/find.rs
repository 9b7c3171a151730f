//! Find queries for locating notes

use super::types::QueryResult;
use crate::graph::{Graph, NoteRecord, NoteRef};

/// Query for finding notes by various criteria
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Filter by tag, including the leading `#`
    pub tag: Option<String>,
    /// Filter by citation key
    pub cites: Option<String>,
    /// Filter by source file
    pub filename: Option<String>,
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Number of results to skip
    pub offset: Option<usize>,
}

impl FindQuery {
    /// Create a new empty query (matches all notes)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn citing(mut self, key: impl Into<String>) -> Self {
        self.cites = Some(key.into());
        self
    }

    pub fn in_file(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title_contains = Some(text.into().to_lowercase());
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results (for pagination)
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Execute the query against a graph; notes come back ordered by id
    pub fn execute<'g>(&self, graph: &'g Graph) -> QueryResult<'g> {
        let matching: Vec<NoteRef<'g>> = graph
            .records()
            .filter(|(_, record)| self.matches(record))
            .filter_map(|(id, _)| graph.note(id))
            .collect();

        let total_count = matching.len();
        let notes = matching
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        QueryResult { notes, total_count }
    }

    /// Check if a note matches all query criteria
    fn matches(&self, record: &NoteRecord) -> bool {
        if let Some(ref tag) = self.tag {
            if !record.tags.contains(tag) {
                return false;
            }
        }

        if let Some(ref key) = self.cites {
            if !record.citations.contains(key) {
                return false;
            }
        }

        if let Some(ref filename) = self.filename {
            if &record.filename != filename {
                return false;
            }
        }

        if let Some(ref text) = self.title_contains {
            if !record.title.to_lowercase().contains(text.as_str()) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FactStore, NoteId};

    fn create_test_graph() -> Graph {
        let mut store = FactStore::new();
        store.add_note(1, "Fleeting notes", "inbox.md");
        store.add_note(2, "Permanent notes", "notes.md");
        store.add_note(3, "Literature notes", "notes.md");
        store.add_note(4, "Index", "index.md");
        store.add_tag(1, "#method");
        store.add_tag(2, "#method");
        store.add_citation(3, "ahrens2017");
        store.build().graph
    }

    #[test]
    fn test_find_all() {
        let graph = create_test_graph();
        let result = FindQuery::new().execute(&graph);
        assert_eq!(result.notes.len(), 4);
        assert_eq!(result.total_count, 4);
    }

    #[test]
    fn test_find_by_tag() {
        let graph = create_test_graph();
        let result = FindQuery::new().with_tag("#method").execute(&graph);
        let ids: Vec<_> = result.notes.iter().map(|note| note.id).collect();
        assert_eq!(ids, vec![NoteId::new(1), NoteId::new(2)]);
    }

    #[test]
    fn test_find_by_citation() {
        let graph = create_test_graph();
        let result = FindQuery::new().citing("ahrens2017").execute(&graph);
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[0].title, "Literature notes");
    }

    #[test]
    fn test_find_by_title_ignores_case() {
        let graph = create_test_graph();
        let result = FindQuery::new().with_title("NOTES").execute(&graph);
        assert_eq!(result.notes.len(), 3);
    }

    #[test]
    fn test_find_with_offset_and_limit() {
        let graph = create_test_graph();
        let result = FindQuery::new().offset(1).limit(2).execute(&graph);
        assert_eq!(result.notes.len(), 2);
        assert_eq!(result.notes[0].id, NoteId::new(2));
        assert_eq!(result.total_count, 4);
    }

    #[test]
    fn test_find_combined_filters() {
        let graph = create_test_graph();
        let result = FindQuery::new()
            .in_file("notes.md")
            .with_tag("#method")
            .execute(&graph);
        assert_eq!(result.notes.len(), 1);
    }
}
