//! List the attachments a document references.

use anyhow::{Context, Result};
use md2conf_core::Converter;
use std::path::Path;

pub fn list_attachments(config_path: &Path, file: &Path, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let conversion = Converter::new(config.conversion)
        .convert_file(file)
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    let resolved = conversion.resolve_attachments(&super::source_dir(file));

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for attachment in &resolved {
        let marker = if attachment.exists { "" } else { " (missing)" };
        println!(
            "{}\t{}{}",
            attachment.name,
            attachment.path.display(),
            marker
        );
    }

    Ok(())
}
