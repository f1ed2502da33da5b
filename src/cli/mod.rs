//! Command-line interface definitions for the `confmatrix` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `confmatrix` binary.
#[derive(Debug, Parser)]
#[command(
    name = "confmatrix",
    about = "Expand a base configuration into every combination of declared axes",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Expand the base document and print or write every variant.
    #[command(name = "expand", about = "Expand the base document over the matrix")]
    Expand(ExpandCommand),
    /// Report how many documents the matrix describes.
    #[command(name = "count", about = "Count the documents the matrix would produce")]
    Count(CountCommand),
    /// Print the value stored at a key path in the base document.
    #[command(name = "get", about = "Print the value at a key path")]
    Get(GetCommand),
}

/// Input file overrides shared by subcommands.
#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// Base configuration document (YAML, or JSON when the name ends in `.json`).
    #[arg(long, value_name = "PATH")]
    pub(crate) base: Option<String>,
    /// Matrix file describing the axes of variation.
    #[arg(long, value_name = "PATH")]
    pub(crate) matrix: Option<String>,
}

/// Arguments for the `confmatrix expand` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ExpandCommand {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    /// Output encoding: `json` (one document per line) or `yaml` (a
    /// `---`-separated stream).
    #[arg(long, value_name = "FORMAT")]
    pub(crate) format: Option<String>,
    /// Refuse to expand matrices describing more documents than this.
    #[arg(long, value_name = "N")]
    pub(crate) max_documents: Option<u64>,
    /// Write one file per document into this directory instead of stdout.
    #[arg(long, value_name = "DIR")]
    pub(crate) output_dir: Option<String>,
}

/// Arguments for the `confmatrix count` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct CountCommand {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

/// Arguments for the `confmatrix get` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct GetCommand {
    /// Base configuration document to read from.
    #[arg(long, value_name = "PATH")]
    pub(crate) base: Option<String>,
    /// Output encoding for the value.
    #[arg(long, value_name = "FORMAT")]
    pub(crate) format: Option<String>,
    /// Dot-separated key path; use `[N]` segments to index sequences.
    #[arg(value_name = "KEY_PATH")]
    pub(crate) key_path: String,
}
