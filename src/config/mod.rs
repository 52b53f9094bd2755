//! Configuration loading and schema.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use infoline::config::parse_config;
//! use std::path::Path;
//!
//! let yaml = "modules:\n  Locale:\n    format: 'LANG={1}'\n";
//! let config = parse_config(yaml, Path::new("config.yml")).unwrap();
//! assert_eq!(config.module("Locale").unwrap().format.as_deref(), Some("LANG={1}"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_default_config, parse_config};
pub use schema::{CacheSettings, Config, DisplaySettings, InvalidationMode, ModuleConfig};
