//! Cache command implementation.
//!
//! Provides `infoline cache list`, `infoline cache clear`, etc.

use anyhow::Result;
use chrono::Duration;
use clap::{Args, Subcommand};
use std::io::Write;

use crate::cache::{format_duration, CacheKey, CacheStore, EntryHeader, Lookup};
use crate::config::Config;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the cached output of one module.
    Show {
        /// Module name.
        name: String,
        /// Argument count the output was cached under.
        arg_count: u32,
    },
    /// Drop every cached entry of a module.
    Invalidate {
        /// Module name.
        name: String,
    },
    /// Remove entries the invalidation policy considers stale.
    Prune,
    /// Clear the cache.
    Clear,
    /// Show cache statistics.
    Stats,
}

/// The cache command implementation.
pub struct CacheCommand {
    store: CacheStore,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command over `store`.
    pub fn new(store: CacheStore, args: CacheArgs) -> Self {
        Self { store, args }
    }

    /// Create a cache command for the configured cache directory and policy.
    ///
    /// The store is opened even when `cache.enabled` is off, so a disabled
    /// cache can still be inspected and cleared.
    pub fn from_config(config: &Config, args: CacheArgs) -> crate::error::Result<Self> {
        let store =
            CacheStore::new(config.cache.resolved_dir()).with_policy(config.cache.policy()?);
        Ok(Self::new(store, args))
    }
}

impl Command for CacheCommand {
    fn execute(
        &self,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> crate::error::Result<CommandResult> {
        let exit_code = match &self.args.command {
            CacheSubcommand::List { json } => list_cache(&self.store, *json, out)?,
            CacheSubcommand::Show { name, arg_count } => {
                show_entry(&self.store, name, *arg_count, out, err)?
            }
            CacheSubcommand::Invalidate { name } => invalidate(&self.store, name, out)?,
            CacheSubcommand::Prune => prune_cache(&self.store, out)?,
            CacheSubcommand::Clear => clear_cache(&self.store, out)?,
            CacheSubcommand::Stats => show_stats(&self.store, out)?,
        };

        Ok(if exit_code == 0 {
            CommandResult::success()
        } else {
            CommandResult::failure(exit_code)
        })
    }
}

fn status(store: &CacheStore, header: &EntryHeader) -> &'static str {
    if store.policy().is_fresh(header, None) {
        "fresh"
    } else {
        "stale"
    }
}

fn list_cache(store: &CacheStore, json: bool, out: &mut dyn Write) -> Result<i32> {
    let entries = store.list()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(0);
    }

    if entries.is_empty() {
        writeln!(out, "Cache is empty")?;
        return Ok(0);
    }

    writeln!(out, "{} cached entries:\n", entries.len())?;

    for header in &entries {
        write!(
            out,
            "  {} [{}] {} ago, {} bytes",
            header.key(),
            status(store, header),
            format_duration(header.age()),
            header.size_bytes
        )?;
        match store.policy().remaining(header) {
            Some(left) if left > Duration::zero() => {
                writeln!(out, ", expires in {}", format_duration(left))?
            }
            _ => writeln!(out)?,
        }
    }

    Ok(0)
}

fn show_entry(
    store: &CacheStore,
    name: &str,
    arg_count: u32,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32> {
    let key = CacheKey::new(name, arg_count);

    match store.lookup(&key, None) {
        Lookup::Hit(payload) => {
            out.write_all(&payload)?;
            out.write_all(b"\n")?;
            Ok(0)
        }
        Lookup::Miss => {
            writeln!(err, "No cached output for {}", key)?;
            Ok(1)
        }
        Lookup::Stale => {
            writeln!(err, "Cached output for {} is stale", key)?;
            Ok(1)
        }
        Lookup::Unavailable(e) => {
            writeln!(err, "Cached output for {} is unreadable: {:#}", key, e)?;
            Ok(1)
        }
    }
}

fn invalidate(store: &CacheStore, name: &str, out: &mut dyn Write) -> Result<i32> {
    let removed = store.invalidate(name)?;
    writeln!(out, "Invalidated {} entries for {}", removed, name)?;
    Ok(0)
}

fn prune_cache(store: &CacheStore, out: &mut dyn Write) -> Result<i32> {
    let removed = store.prune()?;
    writeln!(
        out,
        "Pruned {} stale entries ({} policy)",
        removed,
        store.policy().name()
    )?;
    Ok(0)
}

fn clear_cache(store: &CacheStore, out: &mut dyn Write) -> Result<i32> {
    let cleared = store.clear()?;
    if cleared == 0 {
        writeln!(out, "Cache is already empty")?;
    } else {
        writeln!(out, "Cleared {} entries", cleared)?;
    }
    Ok(0)
}

fn show_stats(store: &CacheStore, out: &mut dyn Write) -> Result<i32> {
    let entries = store.list()?;
    let total_size = store.total_size()?;
    let stale_count = entries
        .iter()
        .filter(|h| status(store, h) == "stale")
        .count();
    let fresh_count = entries.len() - stale_count;

    writeln!(out, "Cache Statistics:\n")?;
    writeln!(out, "  Total entries: {}", entries.len())?;
    writeln!(out, "  Fresh: {}", fresh_count)?;
    writeln!(out, "  Stale: {}", stale_count)?;
    writeln!(out, "  Total size: {} bytes", total_size)?;
    writeln!(out, "  Policy: {}", store.policy().name())?;
    writeln!(out, "  Location: {}", store.root().display())?;

    Ok(0)
}
