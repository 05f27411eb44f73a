//! Code fences → Confluence `code` macros.

use crate::tree::{CodeFence, Document, Macro, MacroBody, Node};

pub const CODE_MACRO: &str = "code";

/// Transformer replacing canonical code fences with `code` macros.
///
/// Fences whose children are anything other than a single code text node are
/// left alone.
#[derive(Debug, Clone, Copy)]
pub struct CodeBlockTransformer {
    with_language: bool,
}

impl CodeBlockTransformer {
    pub fn new() -> Self {
        Self {
            with_language: true,
        }
    }

    /// Whether the fence's info string becomes the macro's `language`.
    pub fn with_language(mut self, enabled: bool) -> Self {
        self.with_language = enabled;
        self
    }

    pub fn transform(&self, mut document: Document) -> Document {
        let converted = self.transform_nodes(&mut document.children);
        if converted > 0 {
            tracing::debug!("Converted {} code block(s) to macros", converted);
        }
        document
    }

    fn transform_nodes(&self, nodes: &mut [Node]) -> usize {
        let mut converted = 0;
        for node in nodes.iter_mut() {
            if let Node::CodeFence(fence) = node {
                if let Some(code_macro) = self.code_macro(fence) {
                    *node = Node::Macro(code_macro);
                    converted += 1;
                }
                continue;
            }

            if let Some(children) = node.children_mut() {
                converted += self.transform_nodes(children);
            }
        }
        converted
    }

    fn code_macro(&self, fence: &CodeFence) -> Option<Macro> {
        let text = fence.canonical_text()?;

        let mut parameters = Vec::new();
        if self.with_language {
            if let Some(language) = fence.language() {
                parameters.push(("language".to_string(), language.to_string()));
            }
        }

        Some(Macro {
            name: CODE_MACRO.to_string(),
            parameters,
            body: MacroBody::PlainText(text.to_string()),
        })
    }
}

impl Default for CodeBlockTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert code fences with the default settings.
pub fn transform_code_blocks(document: Document) -> Document {
    CodeBlockTransformer::new().transform(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::parse_document;

    fn collect_macro_bodies(nodes: &[Node], out: &mut Vec<MacroBody>) {
        for node in nodes {
            if let Node::Macro(m) = node {
                out.push(m.body.clone());
            }
            if let Some(children) = node.children() {
                collect_macro_bodies(children, out);
            }
        }
    }

    fn fence(info: Option<&str>, children: Vec<Node>) -> Document {
        Document::new(vec![Node::CodeFence(CodeFence {
            info: info.map(str::to_string),
            children,
        })])
    }

    #[test]
    fn test_canonical_fence_becomes_macro() {
        let doc = fence(None, vec![Node::Code("line1\nline2".into())]);
        let doc = CodeBlockTransformer::new().transform(doc);

        assert_eq!(
            doc.children,
            vec![Node::Macro(Macro {
                name: "code".into(),
                parameters: vec![],
                body: MacroBody::PlainText("line1\nline2".into()),
            })]
        );
    }

    #[test]
    fn test_text_is_not_escaped() {
        let doc = fence(None, vec![Node::Code("if a < b && c > d {}".into())]);
        let doc = CodeBlockTransformer::new().transform(doc);
        let Node::Macro(code) = &doc.children[0] else {
            panic!("expected macro");
        };
        assert_eq!(code.body, MacroBody::PlainText("if a < b && c > d {}".into()));
    }

    #[test]
    fn test_language_parameter() {
        let doc = fence(Some("python title=x"), vec![Node::Code("pass\n".into())]);

        let with = CodeBlockTransformer::new().transform(doc.clone());
        let Node::Macro(code) = &with.children[0] else {
            panic!("expected macro");
        };
        assert_eq!(
            code.parameters,
            vec![("language".to_string(), "python".to_string())]
        );

        let without = CodeBlockTransformer::new()
            .with_language(false)
            .transform(doc);
        let Node::Macro(code) = &without.children[0] else {
            panic!("expected macro");
        };
        assert!(code.parameters.is_empty());
    }

    #[test]
    fn test_non_canonical_shape_left_alone() {
        let doc = fence(
            None,
            vec![Node::Code("a".into()), Node::Text("b".into())],
        );
        let out = CodeBlockTransformer::new().transform(doc.clone());
        assert_eq!(out, doc);

        let empty = fence(None, vec![]);
        assert_eq!(CodeBlockTransformer::new().transform(empty.clone()), empty);
    }

    #[test]
    fn test_nested_fences_converted() {
        let doc = parse_document("* item\n\n  ```sh\n  ls\n  ```\n\n> ```\n> quoted\n> ```\n");
        let doc = transform_code_blocks(doc);

        let mut macros = Vec::new();
        collect_macro_bodies(&doc.children, &mut macros);
        assert_eq!(
            macros,
            vec![
                MacroBody::PlainText("ls\n".into()),
                MacroBody::PlainText("quoted\n".into()),
            ]
        );
    }
}
