//! # md2conf-core
//!
//! Core library for the md2conf Markdown to Confluence converter.
//!
//! This crate turns one Markdown document into a Confluence storage-format
//! page body, the page title, and the set of local files the page references
//! as attachments. Uploading is left to the caller.

pub mod attachments;
pub mod batch;
pub mod config;
pub mod converter;
pub mod markdown;
pub mod storage;
pub mod tree;

pub use attachments::{
    normalize_attachment_name, AttachmentMap, Inserted, NamingCollision, ResolvedAttachment,
};
pub use batch::{check_documents, discover_markdown_files, DocumentReport};
pub use config::{Config, ConfigError, ConversionConfig};
pub use converter::{Conversion, ConvertError, Converter};
pub use markdown::{
    extract_title, fix_list_continuations, parse_document, rewrite_local_resources,
    transform_code_blocks, Locality,
};
pub use storage::serialize;
pub use tree::{Document, Node};
