//! CLI command implementations.

pub mod attachments;
pub mod check;
pub mod convert;
pub mod title;

pub use attachments::list_attachments;
pub use check::check_paths;
pub use convert::{convert_document, ConvertOptions};
pub use title::print_title;

use anyhow::{Context, Result};
use md2conf_core::Config;
use std::path::{Path, PathBuf};

/// Load the config file, or defaults when it does not exist.
pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Directory that a document's relative resource paths resolve against.
pub(crate) fn source_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
