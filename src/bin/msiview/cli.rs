use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for msiview: browse MSI-style databases as virtual archives.
#[derive(Parser, Debug)]
#[command(name = "msiview", version, about = "msiview archive browser")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Probe whether a file opens as a supported database
    Check {
        #[arg(long)]
        path: PathBuf,
    },
    /// List every virtual entry (name, size, timestamp)
    List {
        #[arg(long)]
        path: PathBuf,
        /// Skip the document-summary entry
        #[arg(long, default_value_t = false)]
        no_summary: bool,
    },
    /// Extract all entries into a directory tree
    Extract {
        #[arg(long)]
        path: PathBuf,
        /// Destination directory (created if missing)
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Skip the document-summary entry
        #[arg(long, default_value_t = false)]
        no_summary: bool,
    },
    /// Write one entry to stdout (name match is case-insensitive)
    Cat {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        name: String,
    },
}
