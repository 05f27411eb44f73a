//! Table-of-contents macro insertion.

use crate::tree::{Document, Macro, MacroBody, Node};

/// Parameters of the Confluence `toc` macro.
const TOC_PARAMS: &[(&str, &str)] = &[
    ("printable", "true"),
    ("style", "disc"),
    ("maxLevel", "5"),
    ("minLevel", "1"),
    ("class", "rm-contents"),
    ("exclude", ""),
    ("type", "list"),
    ("outline", "false"),
    ("include", ""),
];

/// The `toc` macro node.
pub fn toc_macro() -> Node {
    Node::Macro(Macro {
        name: "toc".to_string(),
        parameters: TOC_PARAMS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        body: MacroBody::Empty,
    })
}

/// Put a `toc` macro at the top of the page body.
pub fn insert_table_of_contents(mut document: Document) -> Document {
    document.children.insert(0, toc_macro());
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserted_first() {
        let doc = Document::new(vec![Node::Paragraph(vec![Node::Text("body".into())])]);
        let doc = insert_table_of_contents(doc);

        assert_eq!(doc.children.len(), 2);
        let Node::Macro(toc) = &doc.children[0] else {
            panic!("expected macro");
        };
        assert_eq!(toc.name, "toc");
        assert_eq!(toc.body, MacroBody::Empty);
        assert!(toc
            .parameters
            .contains(&("maxLevel".to_string(), "5".to_string())));
    }
}
