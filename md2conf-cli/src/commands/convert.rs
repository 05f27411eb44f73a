//! Convert a single document.

use anyhow::{Context, Result};
use md2conf_core::Converter;
use std::fs;
use std::path::{Path, PathBuf};

/// Flags of the `convert` command.
#[derive(Debug, Default)]
pub struct ConvertOptions {
    pub contents: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

pub fn convert_document(config_path: &Path, file: &Path, opts: ConvertOptions) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if opts.contents {
        config.conversion.table_of_contents = true;
    }

    let conversion = Converter::new(config.conversion)
        .convert_file(file)
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    let payload = if opts.json {
        let mut json = serde_json::to_string_pretty(&conversion)?;
        json.push('\n');
        json
    } else {
        conversion.storage
    };

    match opts.output {
        Some(output) => {
            fs::write(&output, payload)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("Wrote {}", output.display());
        }
        None => print!("{}", payload),
    }

    Ok(())
}
