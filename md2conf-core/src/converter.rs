//! Conversion of one Markdown document into a Confluence page body.

use crate::{
    attachments::{AttachmentMap, NamingCollision, ResolvedAttachment},
    config::ConversionConfig,
    markdown::{
        extract_title, insert_table_of_contents, CodeBlockTransformer, Locality,
        MarkdownProcessor, ResourceRewriter,
    },
    storage,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    NamingCollision(#[from] NamingCollision),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub title: String,
    pub storage: String,
    pub attachments: AttachmentMap,
}

impl Conversion {
    /// Attachments with their originals resolved relative to `source_dir`.
    pub fn resolve_attachments(&self, source_dir: &Path) -> Vec<ResolvedAttachment> {
        self.attachments.resolve(source_dir)
    }
}

/// Runs the full pipeline: list fix-up, parse, title, table of contents,
/// resource rewriting, code macros, serialization.
pub struct Converter {
    processor: MarkdownProcessor,
    locality: Locality,
    code_blocks: CodeBlockTransformer,
    table_of_contents: bool,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            processor: MarkdownProcessor::new(),
            locality: config.locality(),
            code_blocks: CodeBlockTransformer::new().with_language(config.code_language),
            table_of_contents: config.table_of_contents,
        }
    }

    /// Convert Markdown text. `source_path` only feeds the fallback title.
    pub fn convert(&self, source: &str, source_path: &Path) -> Result<Conversion, ConvertError> {
        let mut document = self.processor.parse(source);
        tracing::debug!(
            "Parsed {} into {} top-level block(s)",
            source_path.display(),
            document.children.len()
        );

        let title = extract_title(&mut document, source_path);

        if self.table_of_contents {
            document = insert_table_of_contents(document);
        }

        let (document, attachments) = ResourceRewriter::new(&self.locality).rewrite(document)?;
        let document = self.code_blocks.transform(document);
        let storage = storage::serialize(&document);

        tracing::info!(
            "Converted {} ({:?}, {} attachment(s))",
            source_path.display(),
            title,
            attachments.len()
        );

        Ok(Conversion {
            title,
            storage,
            attachments,
        })
    }

    /// Read and convert a Markdown file.
    pub fn convert_file(&self, path: &Path) -> Result<Conversion, ConvertError> {
        let source = fs::read_to_string(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.convert(&source, path)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}
