//! Command-line interface definitions for cinder

use cinder::config::CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the cinder application
#[derive(Parser)]
#[command(name = "cinder")]
#[command(version)]
#[command(about = "Markdown notes with crash-safe autosave", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, value_name = "PATH", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for cinder
#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite a markdown file in canonical form
    Normalize {
        /// Markdown file to read
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail if the file is not already canonical instead of writing
        #[arg(long)]
        check: bool,
    },

    /// Print the block outline of a markdown file
    Inspect {
        /// Markdown file to read
        file: PathBuf,
    },

    /// Render a markdown file to HTML
    Preview {
        /// Markdown file to read
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a note's content with a file and save it
    Save {
        /// Note identifier
        id: String,

        /// Markdown file holding the new content
        file: PathBuf,
    },

    /// Push a note's unsaved draft to the note store
    Recover {
        /// Note identifier
        id: String,
    },

    /// Manage local drafts
    Drafts {
        #[command(subcommand)]
        action: DraftsAction,
    },
}

/// Draft management subcommands
#[derive(Subcommand)]
pub enum DraftsAction {
    /// List notes with a local draft
    List,

    /// Print a note's draft
    Show {
        /// Note identifier
        id: String,
    },

    /// Delete a note's draft
    Discard {
        /// Note identifier
        id: String,
    },
}
