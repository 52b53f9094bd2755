//! Error types for infoline operations.
//!
//! This module defines [`InfolineError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `InfolineError` for errors that a caller handles distinctly
//! - Cache I/O uses `anyhow::Error` internally and is turned into a
//!   [`Diagnostic`](crate::diagnostic::Diagnostic) before it reaches callers
//! - An error in one module's line never stops other modules from printing

use std::path::PathBuf;
use thiserror::Error;

use crate::format::TemplateError;

/// Core error type for infoline operations.
#[derive(Debug, Error)]
pub enum InfolineError {
    /// A configured format string failed to compile.
    #[error(transparent)]
    InvalidTemplate(#[from] TemplateError),

    /// A probe could not produce its arguments.
    #[error("{probe}: {message}")]
    ProbeFailed { probe: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A configuration value is out of range or malformed.
    #[error("Invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for infoline operations.
pub type Result<T> = std::result::Result<T, InfolineError>;

/// Failure reported by a probe's detection step.
///
/// The message is printed as the module's value when errors are shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProbeError {
    pub message: String,
}

impl ProbeError {
    /// Create a probe error with a display message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Attach the probe name, producing a crate-level error.
    pub fn for_probe(self, probe: impl Into<String>) -> InfolineError {
        InfolineError::ProbeFailed {
            probe: probe.into(),
            message: self.message,
        }
    }
}
