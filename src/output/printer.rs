//! Module line printing with result caching.
//!
//! [`Printer::print_from_cache`] is the protocol every probe goes through:
//!
//! 1. Serve the cached payload for `(name, arg_count)` if there is a fresh one
//! 2. Otherwise compile the configured format, run detection, render
//! 3. Print the line, then store the rendered payload for the next run
//!
//! Nothing in here is fatal to other modules. Cache trouble degrades to
//! recomputation; a bad format string or failed detection prints an error
//! line for that module only.

use std::io::{self, Write};

use crate::cache::{fingerprint, CacheEntry, CacheKey, CacheStore, Lookup};
use crate::config::Config;
use crate::diagnostic::{CacheOperation, Diagnostic};
use crate::error::{InfolineError, ProbeError, Result};
use crate::format::{Template, Value};

use super::theme::LineTheme;

/// Identity and display settings of one module line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec<'a> {
    /// Probe name, also the cache key (e.g. "Locale").
    pub name: &'a str,
    /// Number of format arguments the probe produces.
    pub arg_count: u32,
    /// Display label; defaults to `name`.
    pub key: Option<&'a str>,
    /// Format string; defaults to `{1} {2} ... {arg_count}`.
    pub format: Option<&'a str>,
}

impl<'a> ModuleSpec<'a> {
    /// Create a spec with the default key and format.
    pub fn new(name: &'a str, arg_count: u32) -> Self {
        Self {
            name,
            arg_count,
            key: None,
            format: None,
        }
    }

    /// Apply the `modules.<name>` overrides from `config`.
    pub fn configured(name: &'a str, arg_count: u32, config: &'a Config) -> Self {
        let mut spec = Self::new(name, arg_count);
        if let Some(module) = config.module(name) {
            spec.key = module.key.as_deref();
            spec.format = module.format.as_deref();
        }
        spec
    }

    /// Set the display label.
    pub fn with_key(mut self, key: &'a str) -> Self {
        self.key = Some(key);
        self
    }

    /// Set the format string.
    pub fn with_format(mut self, format: &'a str) -> Self {
        self.format = Some(format);
        self
    }

    /// The label printed before the value.
    pub fn display_key(&self) -> &'a str {
        self.key.unwrap_or(self.name)
    }

    /// The cache identity of this module.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.name, self.arg_count)
    }
}

/// Where a printed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintSource {
    /// Served from the cache; detection did not run.
    Cache,
    /// Detected and rendered in this run.
    Detected,
    /// The module failed; an error line was printed if errors are shown.
    Failed,
}

/// Outcome of printing one module.
#[derive(Debug)]
pub struct PrintReport {
    pub source: PrintSource,
    /// Non-fatal notices collected along the way.
    pub diagnostics: Vec<Diagnostic>,
    /// Why the module failed, for `PrintSource::Failed`.
    pub error: Option<InfolineError>,
}

impl PrintReport {
    fn new(source: PrintSource, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            source,
            diagnostics,
            error: None,
        }
    }

    fn failed(diagnostics: Vec<Diagnostic>, error: InfolineError) -> Self {
        Self {
            source: PrintSource::Failed,
            diagnostics,
            error: Some(error),
        }
    }

    /// Check if the value was served from the cache.
    pub fn from_cache(&self) -> bool {
        self.source == PrintSource::Cache
    }
}

/// Prints module lines, consulting an optional cache.
#[derive(Debug)]
pub struct Printer {
    cache: Option<CacheStore>,
    theme: LineTheme,
    separator: String,
    show_errors: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    /// Create an uncached printer with plain styling.
    pub fn new() -> Self {
        Self {
            cache: None,
            theme: LineTheme::plain(),
            separator: ": ".to_string(),
            show_errors: true,
        }
    }

    /// Build a printer from configuration.
    ///
    /// The cache is attached only when `cache.enabled` is set. Styling is
    /// applied when `use_colors` and `display.color` both allow it.
    pub fn from_config(config: &Config, use_colors: bool) -> Result<Self> {
        let theme = if !use_colors || !config.display.color {
            LineTheme::plain()
        } else if let Some(color) = &config.display.key_color {
            LineTheme::with_key_color(color)?
        } else {
            LineTheme::new()
        };

        let mut printer = Self::new()
            .with_theme(theme)
            .with_separator(config.display.separator.clone())
            .with_show_errors(config.display.show_errors);

        if config.cache.enabled {
            let store =
                CacheStore::new(config.cache.resolved_dir()).with_policy(config.cache.policy()?);
            printer = printer.with_cache(store);
        }

        Ok(printer)
    }

    /// Attach a cache store.
    pub fn with_cache(mut self, store: CacheStore) -> Self {
        self.cache = Some(store);
        self
    }

    /// Detach the cache; every module is detected.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Set the line theme.
    pub fn with_theme(mut self, theme: LineTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the key/value separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Print error lines for failed modules, or stay silent.
    pub fn with_show_errors(mut self, show_errors: bool) -> Self {
        self.show_errors = show_errors;
        self
    }

    /// The attached cache store, if any.
    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Print one module, serving it from the cache when possible.
    ///
    /// `detect` runs only on a cache miss. Its arguments are rendered with
    /// the spec's format; the result is printed and then cached.
    ///
    /// # Errors
    ///
    /// Only failures writing to `out` are returned. Everything else is
    /// reported through the [`PrintReport`].
    pub fn print_from_cache<'v, W, F>(
        &self,
        out: &mut W,
        spec: &ModuleSpec<'_>,
        detect: F,
    ) -> io::Result<PrintReport>
    where
        W: Write + ?Sized,
        F: FnOnce() -> std::result::Result<Vec<Value<'v>>, ProbeError>,
    {
        let key = spec.cache_key();
        let default_pattern;
        let pattern = match spec.format {
            Some(pattern) => pattern,
            None => {
                default_pattern = Template::positional(spec.arg_count).to_string();
                default_pattern.as_str()
            }
        };
        let pattern_fingerprint = fingerprint(pattern);
        let mut diagnostics = Vec::new();

        if let Some(store) = &self.cache {
            match store.lookup(&key, Some(pattern_fingerprint.as_str())) {
                Lookup::Hit(payload) => {
                    tracing::debug!("Printing {} from cache", key);
                    self.print_line(out, spec, &payload)?;
                    return Ok(PrintReport::new(PrintSource::Cache, diagnostics));
                }
                Lookup::Miss => tracing::debug!("No cached output for {}", key),
                Lookup::Stale => tracing::debug!("Cached output for {} is stale", key),
                Lookup::Unavailable(e) => {
                    tracing::warn!("Cache unavailable for {}: {:#}", key, e);
                    diagnostics.push(Diagnostic::CacheUnavailable {
                        operation: CacheOperation::Read,
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        let template = match spec.format {
            Some(pattern) => match Template::compile(pattern) {
                Ok(template) => template,
                Err(e) => {
                    tracing::warn!("Invalid format for {}: {}", spec.name, e);
                    self.print_error(out, spec, &e.to_string())?;
                    return Ok(PrintReport::failed(diagnostics, e.into()));
                }
            },
            None => Template::positional(spec.arg_count),
        };

        let args = match detect() {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!("Detection failed for {}: {}", spec.name, e);
                self.print_error(out, spec, &e.message)?;
                return Ok(PrintReport::failed(diagnostics, e.for_probe(spec.name)));
            }
        };

        let rendered = template.render(&args);
        for diagnostic in &rendered.diagnostics {
            tracing::warn!("{}: {}", spec.name, diagnostic);
        }
        diagnostics.extend(rendered.diagnostics);

        self.print_line(out, spec, rendered.text.as_bytes())?;

        if let Some(store) = &self.cache {
            let entry = CacheEntry::new(&key, rendered.text.into_bytes())
                .with_fingerprint(pattern_fingerprint);

            if let Err(e) = store.write_entry(&entry) {
                tracing::warn!("Could not cache {}: {:#}", key, e);
                diagnostics.push(Diagnostic::CacheUnavailable {
                    operation: CacheOperation::Write,
                    message: format!("{:#}", e),
                });
            }
        }

        Ok(PrintReport::new(PrintSource::Detected, diagnostics))
    }

    /// Print an error line for a module, if errors are shown.
    pub fn print_error<W: Write + ?Sized>(
        &self,
        out: &mut W,
        spec: &ModuleSpec<'_>,
        message: &str,
    ) -> io::Result<()> {
        if !self.show_errors {
            return Ok(());
        }

        writeln!(
            out,
            "{}{}{}",
            self.theme.format_key(spec.display_key()),
            self.separator,
            self.theme.format_error(message)
        )
    }

    fn print_line<W: Write + ?Sized>(
        &self,
        out: &mut W,
        spec: &ModuleSpec<'_>,
        payload: &[u8],
    ) -> io::Result<()> {
        write!(
            out,
            "{}{}",
            self.theme.format_key(spec.display_key()),
            self.separator
        )?;
        out.write_all(payload)?;
        out.write_all(b"\n")
    }
}
