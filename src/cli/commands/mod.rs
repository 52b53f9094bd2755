//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`infoline render`, `infoline print`)
//! - Shared configuration loading with global flag overrides
//! - Output to any writer, so commands are testable without a terminal

pub mod cache;
pub mod completions;
pub mod dispatcher;
pub mod print;
pub mod render;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, GlobalOptions};
