//! Print command implementation.
//!
//! `infoline print <NAME> [VALUES]...` runs the print-from-cache protocol for
//! one module. The values stand in for what a probe would detect; they are
//! only used when the cache has nothing fresh for the module.

use std::io::Write;

use crate::cli::args::PrintArgs;
use crate::context::ProcessContext;
use crate::error::{ProbeError, Result};
use crate::format::Value;
use crate::output::{ModuleSpec, PrintSource};

use super::dispatcher::{Command, CommandResult};
use super::render::parse_value;

/// The print command implementation.
pub struct PrintCommand<'a> {
    context: &'a ProcessContext,
    args: PrintArgs,
}

impl<'a> PrintCommand<'a> {
    /// Create a new print command.
    pub fn new(context: &'a ProcessContext, args: PrintArgs) -> Self {
        Self { context, args }
    }

    fn spec(&self) -> ModuleSpec<'_> {
        let mut spec = ModuleSpec::configured(
            &self.args.name,
            self.args.effective_arg_count(),
            self.context.config(),
        );
        if let Some(key) = &self.args.key {
            spec = spec.with_key(key);
        }
        if let Some(format) = &self.args.format {
            spec = spec.with_format(format);
        }
        spec
    }

    fn detect(&self) -> std::result::Result<Vec<Value<'_>>, ProbeError> {
        if let Some(message) = &self.args.error {
            return Err(ProbeError::new(message.clone()));
        }

        Ok(self
            .args
            .values
            .iter()
            .map(|raw| parse_value(raw, self.args.typed))
            .collect())
    }
}

impl Command for PrintCommand<'_> {
    fn execute(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<CommandResult> {
        let spec = self.spec();
        let report = self
            .context
            .printer()
            .print_from_cache(out, &spec, || self.detect())?;

        for diagnostic in &report.diagnostics {
            writeln!(err, "warning: {}", diagnostic)?;
        }

        match report.source {
            PrintSource::Cache => {
                tracing::debug!("{} served from cache", spec.name);
                Ok(CommandResult::success())
            }
            PrintSource::Detected => Ok(CommandResult::success()),
            PrintSource::Failed => {
                if let Some(e) = &report.error {
                    tracing::debug!("{} failed: {}", spec.name, e);
                }
                Ok(CommandResult::failure(1))
            }
        }
    }
}
