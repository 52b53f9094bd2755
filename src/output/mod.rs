//! Module line output.
//!
//! - Line styling in [`theme`]
//! - The print-from-cache protocol in [`printer`]

pub mod printer;
pub mod theme;

pub use printer::{ModuleSpec, PrintReport, PrintSource, Printer};
pub use theme::{should_use_colors, LineTheme};
