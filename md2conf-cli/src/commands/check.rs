//! Check many documents for conversion problems.

use anyhow::{bail, Result};
use md2conf_core::{check_documents, discover_markdown_files, Converter, DocumentReport};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CheckSummary<'a> {
    documents: usize,
    failures: usize,
    reports: &'a [DocumentReport],
}

/// Convert every Markdown file under `paths`; fails if any document fails.
pub fn check_paths(config_path: &Path, paths: &[PathBuf], json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let converter = Converter::new(config.conversion);

    let files = discover_markdown_files(paths);
    let reports = check_documents(&converter, &files);
    let failures = reports.iter().filter(|r| !r.is_ok()).count();

    let summary = CheckSummary {
        documents: reports.len(),
        failures,
        reports: &reports,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Checked {} documents, {} with problems",
            summary.documents, failures
        );
        for report in reports.iter().filter(|r| !r.is_ok()) {
            println!("- {}", report.path.display());
            if let Some(error) = &report.error {
                println!("  error: {}", error);
            }
            for missing in &report.missing {
                println!("  missing attachment: {}", missing);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} documents failed the check", failures, summary.documents);
    }
    Ok(())
}
