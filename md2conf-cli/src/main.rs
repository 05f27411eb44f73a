//! # md2conf CLI
//!
//! Command-line interface for converting Markdown into Confluence pages.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "md2conf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (optional; defaults apply when absent)
    #[arg(long, default_value = md2conf_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown file to Confluence storage format
    Convert {
        /// Markdown file to convert
        file: PathBuf,

        /// Insert a table of contents at the top of the page
        #[arg(long)]
        contents: bool,

        /// Emit title, storage markup, and attachments as JSON
        #[arg(long)]
        json: bool,

        /// Write output to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the page title a document would get
    Title {
        /// Markdown file
        file: PathBuf,
    },

    /// List the local files a document references as attachments
    Attachments {
        /// Markdown file
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Convert files or directories and report collisions and missing files
    Check {
        /// Markdown files or directories to walk
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Convert {
            file,
            contents,
            json,
            output,
        } => {
            let opts = commands::ConvertOptions {
                contents,
                json,
                output,
            };
            commands::convert_document(&cli.config, &file, opts)
        }
        Commands::Title { file } => commands::print_title(&file),
        Commands::Attachments { file, json } => {
            commands::list_attachments(&cli.config, &file, json)
        }
        Commands::Check { paths, json } => commands::check_paths(&cli.config, &paths, json),
    }
}
