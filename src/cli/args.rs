//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    count::CountArgs, index::IndexCommands, init::InitArgs, link::LinkCommands, new::NewArgs,
    search::SearchArgs, show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "relcache")]
#[command(author, version, about = "Relation-count caching for plain-text entity files")]
#[command(long_about = "Manage entities stored as YAML files, their relations, and cached relation counts backed by a local SQLite index.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .relcache/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project
    Init(InitArgs),

    /// Create a new entity
    New(NewArgs),

    /// Change an entity's relations
    #[command(subcommand)]
    Link(LinkCommands),

    /// Report relation counts without loading members
    Count(CountArgs),

    /// Show an entity with all relation members
    Show(ShowArgs),

    /// Search entity titles
    Search(SearchArgs),

    /// Manage the local index
    #[command(subcommand)]
    Index(IndexCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (yaml for show)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
}
