//! Result caching for probe output.
//!
//! This module persists a probe's rendered output keyed by probe name and
//! argument count, so later runs can print it without running detection
//! again. Freshness is decided by an injectable [`InvalidationPolicy`].

pub mod entry;
pub mod policy;
pub mod store;

pub use entry::{CacheEntry, CacheKey, EntryHeader, ENTRY_FORMAT_VERSION};
pub use policy::{
    fingerprint, format_duration, parse_ttl, InvalidationPolicy, Manual, MaxAge, PatternDigest,
};
pub use store::{CacheStore, Lookup};

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("infoline")
}
