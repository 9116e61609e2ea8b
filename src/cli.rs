//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `labelflow`.
#[derive(Debug, Parser)]
#[command(name = "labelflow", version, about = "Label-driven ticket workflow automation")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List candidate issues (actionable ones only, unless --all).
    List {
        /// Include completed, canceled, and in-review issues.
        #[arg(long)]
        all: bool,
    },
    /// Promote issues from the candidate label to the ready label.
    Promote {
        /// Specific issue identifiers to promote; when omitted, every
        /// actionable candidate is promoted.
        identifiers: Vec<String>,
        /// Show what would be promoted without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show one issue in its normalized form.
    Show {
        /// Issue identifier (e.g. PROJ-42 or #42).
        identifier: String,
    },
}
