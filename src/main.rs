//! infoline CLI entry point.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use infoline::cli::{Cli, CommandDispatcher, GlobalOptions};
use infoline::output::should_use_colors;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, so stdout carries only module lines
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("infoline=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("infoline=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("infoline starting with args: {:?}", cli);

    let options = GlobalOptions::from_cli(&cli, should_use_colors());
    let dispatcher = CommandDispatcher::new(options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut err = io::stderr();

    let result = dispatcher.dispatch(&cli, &mut out, &mut err);
    let _ = out.flush();

    match result {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            let _ = writeln!(err, "{} {}", console::style("Error:").red().bold(), e);
            ExitCode::from(1)
        }
    }
}
