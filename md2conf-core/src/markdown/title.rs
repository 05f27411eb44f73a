//! Page title extraction.

use crate::tree::{Document, Node};
use std::path::Path;

/// Title used when neither a heading nor a file name is available.
pub const UNTITLED: &str = "Untitled";

/// Remove the first level-1 heading from the document and return its text.
///
/// Falls back to the source file name without its extension when the
/// document has no such heading (or the heading is empty).
pub fn extract_title(document: &mut Document, source_path: &Path) -> String {
    match take_first_heading(document) {
        Some(title) if !title.is_empty() => title,
        _ => fallback_title(source_path),
    }
}

/// Remove the first level-1 heading, searching nested containers in
/// document order.
pub fn take_first_heading(document: &mut Document) -> Option<String> {
    remove_first_heading(&mut document.children)
        .map(|heading| heading.plain_text().trim().to_string())
}

fn remove_first_heading(nodes: &mut Vec<Node>) -> Option<Node> {
    for idx in 0..nodes.len() {
        if matches!(nodes[idx], Node::Heading { level: 1, .. }) {
            return Some(nodes.remove(idx));
        }
        if let Some(children) = nodes[idx].children_mut() {
            if let Some(found) = remove_first_heading(children) {
                return Some(found);
            }
        }
    }
    None
}

/// File name of `source_path` without its final extension.
pub fn fallback_title(source_path: &Path) -> String {
    source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNTITLED)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::parse_document;

    #[test]
    fn test_extracts_and_removes_h1() {
        let mut doc = parse_document("Intro\n\n# The *Title*\n\nBody\n\n# Second\n");
        let title = extract_title(&mut doc, Path::new("notes.md"));

        assert_eq!(title, "The Title");
        assert_eq!(doc.children.len(), 3);
        assert!(matches!(&doc.children[2], Node::Heading { level: 1, .. }));
    }

    #[test]
    fn test_lower_level_headings_are_not_titles() {
        let mut doc = parse_document("## Section\n\ntext\n");
        assert_eq!(extract_title(&mut doc, Path::new("dir/notes.md")), "notes");
        assert_eq!(doc.children.len(), 2);
    }

    #[test]
    fn test_fallback_uses_file_stem() {
        let mut doc = parse_document("no heading at all\n");
        assert_eq!(extract_title(&mut doc, Path::new("notes.md")), "notes");
        assert_eq!(fallback_title(Path::new("archive.tar.gz")), "archive.tar");
        assert_eq!(fallback_title(Path::new("")), UNTITLED);
    }

    #[test]
    fn test_nested_heading_is_found() {
        let mut doc = parse_document("> # Quoted title\n> body\n");
        assert_eq!(take_first_heading(&mut doc), Some("Quoted title".to_string()));
        match &doc.children[0] {
            Node::BlockQuote(children) => {
                assert_eq!(children.len(), 1);
                assert!(matches!(children[0], Node::Paragraph(_)));
            }
            other => panic!("expected block quote, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_heading_falls_back() {
        let mut doc = parse_document("#\n\ntext\n");
        assert_eq!(extract_title(&mut doc, Path::new("page.md")), "page");
    }
}
