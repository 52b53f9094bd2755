//! Non-fatal notices produced while printing a module.
//!
//! Diagnostics never change what gets printed. They are returned to the
//! caller so it can log or surface them.

use std::fmt;

/// Which cache operation a [`Diagnostic::CacheUnavailable`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOperation {
    Read,
    Write,
}

impl fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOperation::Read => f.write_str("read"),
            CacheOperation::Write => f.write_str("write"),
        }
    }
}

/// A non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A placeholder referenced an argument that was not supplied.
    /// The placeholder rendered as empty text.
    MissingArgument(usize),

    /// The cache could not be read or written. Reads degrade to a miss.
    CacheUnavailable {
        operation: CacheOperation,
        message: String,
    },
}

impl Diagnostic {
    /// Check if this is a missing-argument notice.
    pub fn is_missing_argument(&self) -> bool {
        matches!(self, Diagnostic::MissingArgument(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingArgument(index) => {
                write!(f, "format argument {{{}}} was not provided", index)
            }
            Diagnostic::CacheUnavailable { operation, message } => {
                write!(f, "cache {} failed: {}", operation, message)
            }
        }
    }
}
