//! Pattern compilation and rendering.
//!
//! - [`value`] - typed format arguments
//! - [`template`] - pattern compilation into segments
//! - [`render`] - substitution of arguments into a compiled template
//!
//! # Example
//!
//! ```
//! use infoline::format::{Template, Value};
//!
//! let template = Template::compile("{1} ({2})").unwrap();
//! let rendered = template.render(&[Value::Str("Apple M1"), Value::UInt(8)]);
//! assert_eq!(rendered.text, "Apple M1 (8)");
//! ```

pub mod render;
pub mod template;
pub mod value;

pub use render::{render, render_into, Rendered};
pub use template::{Segment, Template, TemplateError, TemplateErrorKind};
pub use value::{append_value, Value, LIST_SEPARATOR};
