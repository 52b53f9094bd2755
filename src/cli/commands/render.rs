//! Render command implementation.
//!
//! `infoline render <FORMAT> [ARGS]...` compiles a format string and prints
//! it rendered with the given arguments.

use std::io::Write;

use crate::cli::args::RenderArgs;
use crate::error::Result;
use crate::format::{Template, Value};

use super::dispatcher::{Command, CommandResult};

/// Exit code for `--strict` when a placeholder had no argument.
pub const MISSING_ARGUMENT_EXIT_CODE: i32 = 2;

/// Turn a command-line argument into a format value.
///
/// With `typed`, integers become `UInt`/`Int` and decimals become `Double`;
/// everything else stays text.
pub fn parse_value(raw: &str, typed: bool) -> Value<'_> {
    if !typed {
        return Value::Str(raw);
    }

    if let Ok(n) = raw.parse::<u64>() {
        return Value::UInt(n);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if raw.contains('.') {
        if let Ok(d) = raw.parse::<f64>() {
            return Value::Double(d);
        }
    }

    Value::Str(raw)
}

/// The render command implementation.
pub struct RenderCommand {
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(args: RenderArgs) -> Self {
        Self { args }
    }
}

impl Command for RenderCommand {
    fn execute(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<CommandResult> {
        let template = Template::compile(&self.args.format)?;

        let values: Vec<Value<'_>> = self
            .args
            .args
            .iter()
            .map(|raw| parse_value(raw, self.args.typed))
            .collect();

        let rendered = template.render(&values);
        writeln!(out, "{}", rendered.text)?;

        for diagnostic in &rendered.diagnostics {
            writeln!(err, "warning: {}", diagnostic)?;
        }

        if self.args.strict && !rendered.is_complete() {
            return Ok(CommandResult::failure(MISSING_ARGUMENT_EXIT_CODE));
        }

        Ok(CommandResult::success())
    }
}
