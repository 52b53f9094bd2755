//! Styling for module lines.

use console::{Color, Style};

use crate::error::{InfolineError, Result};

/// Styles applied to module lines.
#[derive(Debug, Clone)]
pub struct LineTheme {
    /// Style for module keys (bold, optionally colored).
    pub key: Style,
    /// Style for error values (red).
    pub error: Style,
}

impl Default for LineTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTheme {
    /// Create the default theme: bold keys, red errors.
    pub fn new() -> Self {
        Self {
            key: Style::new().bold(),
            error: Style::new().red(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            key: Style::new(),
            error: Style::new(),
        }
    }

    /// Create a theme with keys in the named color.
    ///
    /// Accepts the eight basic color names or an ANSI 256-color index.
    pub fn with_key_color(name: &str) -> Result<Self> {
        let key = match parse_color(name) {
            Some(ColorSpec::Basic(color)) => Style::new().bold().fg(color),
            Some(ColorSpec::Indexed(index)) => Style::new().bold().color256(index),
            None => {
                return Err(InfolineError::InvalidSetting {
                    key: "display.key_color".to_string(),
                    message: format!("unknown color '{}'", name),
                })
            }
        };

        Ok(Self { key, ..Self::new() })
    }

    /// Format a module key.
    pub fn format_key(&self, key: &str) -> String {
        format!("{}", self.key.apply_to(key))
    }

    /// Format an error value.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(msg))
    }
}

enum ColorSpec {
    Basic(Color),
    Indexed(u8),
}

fn parse_color(name: &str) -> Option<ColorSpec> {
    let color = match name.trim().to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        other => return other.parse().ok().map(ColorSpec::Indexed),
    };
    Some(ColorSpec::Basic(color))
}

/// Check if colors should be used.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check if stdout is a TTY
    console::Term::stdout().is_term()
}
