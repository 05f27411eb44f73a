//! Markdown front end and tree transforms.

pub mod code;
pub mod html;
pub mod lists;
pub mod parser;
pub mod resources;
pub mod title;
pub mod toc;

use crate::tree::Document;
use pulldown_cmark::Options;

pub use code::{transform_code_blocks, CodeBlockTransformer};
pub use lists::fix_list_continuations;
pub use parser::parse_document;
pub use resources::{rewrite_local_resources, Locality, ResourceRewriter};
pub use title::extract_title;
pub use toc::insert_table_of_contents;

/// Markdown reader: list fix-up followed by parsing.
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        Self {
            options: parser::parser_options(),
        }
    }

    /// Normalize list continuations and parse the result into a tree.
    pub fn parse(&self, markdown: &str) -> Document {
        let normalized = fix_list_continuations(markdown);
        parser::parse_with_options(&normalized, self.options)
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}
