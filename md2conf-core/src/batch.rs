//! Checking many documents at once.

use crate::converter::Converter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of converting one document during a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub attachments: usize,
    /// Attachment originals that do not exist next to the document.
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.missing.is_empty()
    }
}

/// Expand files and directories into a sorted list of `.md` files.
///
/// Explicit file arguments are kept whatever their extension.
pub fn discover_markdown_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }

        for entry in WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if entry.path().extension().is_some_and(|ext| ext == "md") {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files
}

/// Convert every document and report collisions, read errors, and
/// attachments missing on disk.
pub fn check_documents(converter: &Converter, files: &[PathBuf]) -> Vec<DocumentReport> {
    tracing::info!("Checking {} markdown file(s)", files.len());
    files.iter().map(|path| check_document(converter, path)).collect()
}

fn check_document(converter: &Converter, path: &Path) -> DocumentReport {
    match converter.convert_file(path) {
        Ok(conversion) => {
            let source_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let missing: Vec<String> = conversion
                .resolve_attachments(source_dir)
                .into_iter()
                .filter(|attachment| !attachment.exists)
                .map(|attachment| attachment.original)
                .collect();
            for original in &missing {
                tracing::warn!("{}: missing attachment {}", path.display(), original);
            }

            DocumentReport {
                path: path.to_path_buf(),
                title: Some(conversion.title),
                attachments: conversion.attachments.len(),
                missing,
                error: None,
            }
        }
        Err(err) => {
            tracing::error!("Failed to convert {}: {}", path.display(), err);
            DocumentReport {
                path: path.to_path_buf(),
                title: None,
                attachments: 0,
                missing: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}
