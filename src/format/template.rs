//! Pattern compilation.
//!
//! Module output is configured with patterns such as `"{1} ({2})"`, where
//! `{N}` refers to the N-th argument a probe produced (1-based).
//!
//! # Syntax
//!
//! - `{N}` - replaced with argument `N` (`N >= 1`)
//! - `{{` - produces a literal `{`
//!
//! A lone `}` is literal text.
//!
//! # Example
//!
//! ```
//! use infoline::format::{Segment, Template};
//!
//! let template = Template::compile("Locale: {1}").unwrap();
//! assert_eq!(
//!     template.segments(),
//!     &[Segment::Literal("Locale: ".to_string()), Segment::Placeholder(1)]
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const OPEN: char = '{';
const CLOSE: char = '}';

/// A segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Argument reference: {N}, 1-based
    Placeholder(usize),
}

/// Why a pattern failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    #[error("unterminated placeholder")]
    Unterminated,

    #[error("empty placeholder")]
    Empty,

    #[error("placeholder '{0}' is not a number")]
    NotANumber(String),

    #[error("placeholder index must be at least 1")]
    ZeroIndex,

    #[error("placeholder index '{0}' is too large")]
    Overflow(String),
}

/// A pattern that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid format string at byte {offset}: {kind}")]
pub struct TemplateError {
    /// Byte offset of the offending open marker.
    pub offset: usize,
    /// What was wrong with it.
    pub kind: TemplateErrorKind,
}

/// A compiled, immutable pattern.
///
/// Compile once and render any number of times with different arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    highest_index: usize,
}

impl Template {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] pointing at the open marker of the first
    /// malformed placeholder. No partial template is produced.
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut current_literal = String::new();
        let mut chars = pattern.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != OPEN {
                current_literal.push(c);
                continue;
            }

            if matches!(chars.peek(), Some(&(_, OPEN))) {
                // Escaped: {{ becomes {
                chars.next();
                current_literal.push(OPEN);
                continue;
            }

            let body_start = offset + OPEN.len_utf8();
            let body_len = pattern[body_start..]
                .find(CLOSE)
                .ok_or(TemplateError {
                    offset,
                    kind: TemplateErrorKind::Unterminated,
                })?;
            let body = &pattern[body_start..body_start + body_len];
            let index = parse_index(body).map_err(|kind| TemplateError { offset, kind })?;

            // Skip the body and the close marker
            let end = body_start + body_len + CLOSE.len_utf8();
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }

            if !current_literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
            }
            segments.push(Segment::Placeholder(index));
        }

        if !current_literal.is_empty() {
            segments.push(Segment::Literal(current_literal));
        }

        Ok(Self::from_segments(segments))
    }

    /// The default pattern for a probe with `arg_count` arguments:
    /// `{1} {2} ... {N}`, with at least `{1}`.
    pub fn positional(arg_count: u32) -> Self {
        let count = arg_count.max(1) as usize;
        let mut segments = Vec::with_capacity(count * 2 - 1);
        for index in 1..=count {
            if index > 1 {
                segments.push(Segment::Literal(" ".to_string()));
            }
            segments.push(Segment::Placeholder(index));
        }
        Self::from_segments(segments)
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let highest_index = segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Placeholder(i) => Some(*i),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0);

        Self {
            segments,
            highest_index,
        }
    }

    /// The compiled segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Highest placeholder index referenced, or 0 for a literal-only pattern.
    ///
    /// Argument arrays at least this long render without diagnostics.
    pub fn highest_index(&self) -> usize {
        self.highest_index
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Writes the template back out as a pattern, re-escaping `{`.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(&text.replace(OPEN, "{{"))?,
                Segment::Placeholder(i) => write!(f, "{{{}}}", i)?,
            }
        }
        Ok(())
    }
}

fn parse_index(body: &str) -> Result<usize, TemplateErrorKind> {
    if body.is_empty() {
        return Err(TemplateErrorKind::Empty);
    }
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TemplateErrorKind::NotANumber(body.to_string()));
    }
    match body.parse::<usize>() {
        Ok(0) => Err(TemplateErrorKind::ZeroIndex),
        Ok(index) => Ok(index),
        Err(_) => Err(TemplateErrorKind::Overflow(body.to_string())),
    }
}
