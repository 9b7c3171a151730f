//! Link classification and alias syntax
//!
//! Raw links arrive as `(src_id, target, title)` tuples. A link whose title
//! carries the sequence marker (`/` followed by a lowercase letter and then
//! lowercase letters or digits) declares an alias for the target note; any
//! other title is the annotation of a direct link.

use crate::graph::{Link, NoteId};

/// Leading character of a sequence declaration title.
pub const SEQUENCE_MARKER: char = '/';

/// A sequence-alias declaration extracted from a raw link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared alias (the owner's root alias followed by the title suffix)
    pub alias: String,
    /// Note the alias denotes
    pub dest: NoteId,
    /// Note that declared the alias
    pub owner: NoteId,
}

/// Outcome of classifying a raw link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Free-form link with a possibly empty annotation
    Direct(Link),
    /// Alias declaration for the target note
    Sequence(Declaration),
}

/// Classify a raw `(src_id, target, title)` tuple.
///
/// Returns `None` unless `src_id` is digits-only and `target` is a same-document
/// note reference (`#<digits>`).
pub fn classify(src_id: &str, target: &str, title: &str) -> Option<Classified> {
    if !is_digits(src_id) {
        return None;
    }
    let dest = target.strip_prefix('#').filter(|id| is_digits(id))?;
    let src = NoteId::parse(src_id)?;
    let dest = NoteId::parse(dest)?;

    match sequence_suffix(title) {
        Some(suffix) => Some(Classified::Sequence(Declaration {
            alias: format!("{}{suffix}", src.root_alias()),
            dest,
            owner: src,
        })),
        None => Some(Classified::Direct(Link::new(src, dest, title))),
    }
}

/// Suffix of a sequence declaration title, without the marker.
fn sequence_suffix(title: &str) -> Option<&str> {
    let suffix = title.strip_prefix(SEQUENCE_MARKER)?;
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return None,
    }
    if chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        Some(suffix)
    } else {
        None
    }
}

/// Non-empty and ASCII digits only.
pub fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `text` matches `digit (digit | lowercase-letter)*`.
pub fn is_alias(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_digit() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

/// Whether `alias` is a root alias, i.e. has no parent.
pub fn is_root_alias(alias: &str) -> bool {
    is_digits(alias)
}

/// Parent of an alias, derived syntactically.
///
/// Strips the maximal trailing run of digits or of lowercase letters. Returns
/// `None` for malformed input and for root aliases, where stripping would
/// leave nothing.
pub fn parent_alias(alias: &str) -> Option<&str> {
    if !is_alias(alias) {
        return None;
    }
    let bytes = alias.as_bytes();
    let last_is_digit = bytes[bytes.len() - 1].is_ascii_digit();
    let cut = bytes
        .iter()
        .rposition(|b| b.is_ascii_digit() != last_is_digit)
        .map(|i| i + 1)
        .unwrap_or(0);
    if cut == 0 {
        None
    } else {
        Some(&alias[..cut])
    }
}

/// Whether `next` directly follows `prev` in the alias hierarchy.
pub fn is_sequence(prev: &str, next: &str) -> bool {
    parent_alias(next) == Some(prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_alias_of_root_is_none() {
        assert_eq!(parent_alias("7"), None);
        assert_eq!(parent_alias("123"), None);
    }

    #[test]
    fn test_parent_alias_strips_trailing_run() {
        assert_eq!(parent_alias("12a3"), Some("12a"));
        assert_eq!(parent_alias("1a"), Some("1"));
        assert_eq!(parent_alias("3abc"), Some("3"));
        assert_eq!(parent_alias("12a34"), Some("12a"));
        assert_eq!(parent_alias("0a1b"), Some("0a1"));
    }

    #[test]
    fn test_parent_alias_rejects_malformed_input() {
        assert_eq!(parent_alias(""), None);
        assert_eq!(parent_alias("a1"), None);
        assert_eq!(parent_alias("1A"), None);
        assert_eq!(parent_alias("1-a"), None);
    }

    #[test]
    fn test_is_sequence() {
        assert!(is_sequence("1", "1a"));
        assert!(is_sequence("2", "2b"));
        assert!(is_sequence("3", "3abc"));
        assert!(!is_sequence("4a", "4b"));
        assert!(!is_sequence("5c", "5"));
        assert!(!is_sequence("", "6"));
        assert!(!is_sequence("2", "b"));
    }

    #[test]
    fn test_is_alias_accepts_scientific_notation_lookalike() {
        assert!(is_alias("104e1"));
        assert!(is_alias("0"));
        assert!(!is_alias(""));
        assert!(!is_alias("e1"));
    }

    #[test]
    fn test_classify_direct_link_keeps_title_as_description() {
        let classified = classify("0", "#1", "see also").unwrap();
        assert_eq!(
            classified,
            Classified::Direct(Link::new(NoteId::new(0), NoteId::new(1), "see also"))
        );

        let bare = classify("0", "#1", "").unwrap();
        assert_eq!(
            bare,
            Classified::Direct(Link::new(NoteId::new(0), NoteId::new(1), ""))
        );
    }

    #[test]
    fn test_classify_sequence_declaration() {
        let classified = classify("12", "#30", "/a2").unwrap();
        assert_eq!(
            classified,
            Classified::Sequence(Declaration {
                alias: "12a2".to_string(),
                dest: NoteId::new(30),
                owner: NoteId::new(12),
            })
        );
    }

    #[test]
    fn test_classify_bare_word_is_not_a_declaration() {
        // Without the marker a one-word title stays an annotation
        let classified = classify("1", "#2", "a").unwrap();
        assert!(matches!(classified, Classified::Direct(_)));

        // The marker must be followed by a lowercase letter
        let classified = classify("1", "#2", "/1a").unwrap();
        assert!(matches!(classified, Classified::Direct(_)));
        let classified = classify("1", "#2", "/A").unwrap();
        assert!(matches!(classified, Classified::Direct(_)));
    }

    #[test]
    fn test_classify_rejects_external_targets_and_bad_sources() {
        assert_eq!(classify("0", "https://example.com", ""), None);
        assert_eq!(classify("0", "#intro", ""), None);
        assert_eq!(classify("0", "#", ""), None);
        assert_eq!(classify("0", "", ""), None);
        assert_eq!(classify("x1", "#1", ""), None);
        assert_eq!(classify("", "#1", ""), None);
    }

    #[test]
    fn test_classify_declaration_from_padded_source() {
        let Some(Classified::Sequence(declaration)) = classify("01", "#2", "/a") else {
            panic!("expected a declaration");
        };
        assert_eq!(declaration.alias, "1a");
        assert_eq!(declaration.owner, NoteId::new(1));
        assert_eq!(parent_alias(&declaration.alias), Some("1"));
    }
}
