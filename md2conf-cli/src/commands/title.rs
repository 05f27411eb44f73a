//! Print the title a document converts to.

use anyhow::{Context, Result};
use md2conf_core::markdown::{extract_title, MarkdownProcessor};
use std::fs;
use std::path::Path;

/// Only parsing and title extraction run, so resource problems such as
/// naming collisions do not hide the title.
pub fn print_title(file: &Path) -> Result<()> {
    let source =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut document = MarkdownProcessor::new().parse(&source);

    println!("{}", extract_title(&mut document, file));
    Ok(())
}
