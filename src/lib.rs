//! Infoline - format rendering and result caching for system-information lines.
//!
//! Each module of a system-information display (CPU, Locale, GPU, ...) is a
//! probe that produces a few typed values. Infoline renders those values
//! through a user-supplied format string and caches the rendered text so the
//! next run can skip detection entirely.
//!
//! # Modules
//!
//! - [`format`] - Typed values, format string compilation, and rendering
//! - [`cache`] - File-backed result cache with pluggable invalidation
//! - [`output`] - The print-from-cache protocol and line styling
//! - [`context`] - Process context with compute-once detections
//! - [`config`] - YAML configuration loading
//! - [`cli`] - Command-line interface and argument parsing
//! - [`diagnostic`] - Non-fatal notices raised while printing
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use infoline::format::{Template, Value};
//!
//! let template = Template::compile("Locale: {1}").unwrap();
//! let rendered = template.render(&[Value::Str("en_US.UTF-8")]);
//! assert_eq!(rendered.text, "Locale: en_US.UTF-8");
//! assert!(rendered.is_complete());
//! ```
//!
//! For the caching protocol, see [`output::Printer::print_from_cache`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod format;
pub mod output;

pub use error::{InfolineError, ProbeError, Result};
