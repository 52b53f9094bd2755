//! Cache entry and header types.
//!
//! An entry file is a single JSON header line followed by the raw payload:
//!
//! ```text
//! {"version":1,"probe_key":"Locale","arg_count":1,...}\n
//! en_US.UTF-8
//! ```
//!
//! Keeping both in one file means a single rename publishes them together.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk entry format.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// Identity of a cached probe result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Stable probe name (e.g., "Locale").
    pub probe_key: String,
    /// Number of format arguments the probe produces.
    pub arg_count: u32,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(probe_key: impl Into<String>, arg_count: u32) -> Self {
        Self {
            probe_key: probe_key.into(),
            arg_count,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.probe_key, self.arg_count)
    }
}

/// Metadata stored in front of every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Entry format version.
    pub version: u32,
    /// Probe name.
    pub probe_key: String,
    /// Argument count the payload was rendered with.
    pub arg_count: u32,
    /// When this entry was written.
    pub cached_at: DateTime<Utc>,
    /// Fingerprint of the pattern the payload was rendered from, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Payload size in bytes.
    pub size_bytes: u64,
}

impl EntryHeader {
    /// The key this header belongs to.
    pub fn key(&self) -> CacheKey {
        CacheKey::new(&self.probe_key, self.arg_count)
    }

    /// Check whether this header was written for `key`.
    pub fn matches(&self, key: &CacheKey) -> bool {
        self.probe_key == key.probe_key && self.arg_count == key.arg_count
    }

    /// Get the age of this entry.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.cached_at)
    }
}

/// A rendered payload together with its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub header: EntryHeader,
    pub payload: Vec<u8>,
}

impl CacheEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(key: &CacheKey, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        Self {
            header: EntryHeader {
                version: ENTRY_FORMAT_VERSION,
                probe_key: key.probe_key.clone(),
                arg_count: key.arg_count,
                cached_at: Utc::now(),
                fingerprint: None,
                size_bytes: payload.len() as u64,
            },
            payload,
        }
    }

    /// Record the fingerprint of the pattern that produced the payload.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.header.fingerprint = Some(fingerprint.into());
        self
    }

    /// Override the write timestamp.
    pub fn with_cached_at(mut self, cached_at: DateTime<Utc>) -> Self {
        self.header.cached_at = cached_at;
        self
    }

    /// Serialize to the on-disk representation.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(&self.header).context("Failed to serialize header")?;
        bytes.push(b'\n');
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    /// Parse the on-disk representation.
    ///
    /// Fails on a missing header line, an unknown format version, or a
    /// payload whose length disagrees with the header.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let newline = bytes
            .iter()
            .position(|&b| b == b'\n')
            .context("Missing entry header")?;

        let header = decode_header(&bytes[..newline])?;
        let payload = bytes[newline + 1..].to_vec();

        if payload.len() as u64 != header.size_bytes {
            bail!(
                "Truncated entry: expected {} payload bytes, found {}",
                header.size_bytes,
                payload.len()
            );
        }

        Ok(Self { header, payload })
    }
}

/// Parse just the header line of an entry.
pub fn decode_header(line: &[u8]) -> Result<EntryHeader> {
    let header: EntryHeader =
        serde_json::from_slice(line).context("Malformed entry header")?;

    if header.version != ENTRY_FORMAT_VERSION {
        bail!("Unsupported entry format version {}", header.version);
    }

    Ok(header)
}
