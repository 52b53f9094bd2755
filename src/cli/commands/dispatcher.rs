//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, load_default_config, Config};
use crate::context::ProcessContext;
use crate::error::Result;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `out` - Destination for command output (stdout in the binary)
    /// * `err` - Destination for warnings (stderr in the binary)
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Settings taken from global flags.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<std::path::PathBuf>,
    pub cache_dir: Option<std::path::PathBuf>,
    pub no_cache: bool,
    pub use_colors: bool,
}

impl GlobalOptions {
    /// Collect global options from parsed arguments.
    pub fn from_cli(cli: &Cli, colors_supported: bool) -> Self {
        Self {
            config: cli.config.clone(),
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
            use_colors: colors_supported && !cli.no_color,
        }
    }

    /// Load configuration and apply flag overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => load_default_config()?,
        };

        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        if self.no_cache {
            config.cache.enabled = false;
        }

        Ok(config)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: GlobalOptions,
}

impl CommandDispatcher {
    /// Create a new dispatcher with the given global options.
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Get the global options.
    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. Configuration is only loaded by commands that use it.
    pub fn dispatch(
        &self,
        cli: &Cli,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<CommandResult> {
        match &cli.command {
            Commands::Render(args) => {
                let cmd = super::render::RenderCommand::new(args.clone());
                cmd.execute(out, err)
            }
            Commands::Print(args) => {
                let config = self.options.load_config()?;
                let context = ProcessContext::from_config(config, self.options.use_colors)?;
                let cmd = super::print::PrintCommand::new(&context, args.clone());
                cmd.execute(out, err)
            }
            Commands::Cache(args) => {
                let config = self.options.load_config()?;
                let cmd = super::cache::CacheCommand::from_config(&config, args.clone())?;
                cmd.execute(out, err)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(out, err)
            }
        }
    }
}
