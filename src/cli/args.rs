//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;

/// Infoline - render and cache system-information lines.
#[derive(Debug, Parser)]
#[command(name = "infoline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides <config dir>/infoline/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides cache.dir)
    #[arg(long, global = true, env = "INFOLINE_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Neither read nor write cached output
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a format string with the given arguments
    Render(RenderArgs),

    /// Print a module line, served from the cache when possible
    Print(PrintArgs),

    /// Manage cached module output
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Format string, e.g. "{1} ({2})"
    pub format: String,

    /// Format arguments, {1} being the first
    pub args: Vec<String>,

    /// Treat numeric arguments as numbers instead of text
    #[arg(long)]
    pub typed: bool,

    /// Exit with status 2 if a placeholder has no argument
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `print` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PrintArgs {
    /// Module name, also the cache key (e.g. "Locale")
    pub name: String,

    /// Detected values used on a cache miss
    pub values: Vec<String>,

    /// Label printed before the value (overrides modules.<name>.key)
    #[arg(long)]
    pub key: Option<String>,

    /// Format string (overrides modules.<name>.format)
    #[arg(long)]
    pub format: Option<String>,

    /// Number of format arguments (defaults to the number of values)
    #[arg(long, value_name = "N")]
    pub arg_count: Option<u32>,

    /// Treat numeric values as numbers instead of text
    #[arg(long)]
    pub typed: bool,

    /// Fail detection with this message instead of using the values
    #[arg(long, value_name = "MESSAGE", conflicts_with = "values")]
    pub error: Option<String>,
}

impl PrintArgs {
    /// The argument count the module is cached under.
    pub fn effective_arg_count(&self) -> u32 {
        self.arg_count
            .unwrap_or_else(|| u32::try_from(self.values.len()).unwrap_or(u32::MAX))
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
