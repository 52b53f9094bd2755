//! Template rendering.
//!
//! Rendering never fails. A placeholder whose argument is missing renders
//! as empty text and is reported as [`Diagnostic::MissingArgument`].

use crate::diagnostic::Diagnostic;

use super::template::{Segment, Template};
use super::value::{append_value, Value};

/// Output of a single render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    /// The rendered text.
    pub text: String,
    /// Non-fatal notices, in placeholder order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    /// Check if every placeholder resolved.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_missing_argument)
    }

    /// The rendered text as bytes, ready for the cache.
    pub fn into_bytes(self) -> Vec<u8> {
        self.text.into_bytes()
    }
}

/// Render a template against an argument array.
pub fn render(template: &Template, args: &[Value<'_>]) -> Rendered {
    let mut rendered = Rendered::default();
    render_into(
        &mut rendered.text,
        &mut rendered.diagnostics,
        template,
        args,
    );
    rendered
}

/// Render into an existing buffer, appending diagnostics to `diagnostics`.
pub fn render_into(
    buffer: &mut String,
    diagnostics: &mut Vec<Diagnostic>,
    template: &Template,
    args: &[Value<'_>],
) {
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => buffer.push_str(text),
            Segment::Placeholder(index) => match args.get(index - 1) {
                Some(value) => append_value(buffer, value),
                None => {
                    tracing::debug!("Format argument {{{}}} not provided", index);
                    diagnostics.push(Diagnostic::MissingArgument(*index));
                }
            },
        }
    }
}

impl Template {
    /// Render this template against `args`.
    pub fn render(&self, args: &[Value<'_>]) -> Rendered {
        render(self, args)
    }
}
