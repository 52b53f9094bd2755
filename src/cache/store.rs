//! Cache storage implementation.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<probe-dir>/<arg_count>.entry
//! ```
//!
//! `probe-dir` is a hash of the probe key, so a lookup is a single file
//! read with no directory scan.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::entry::{CacheEntry, CacheKey, EntryHeader};
use super::policy::{InvalidationPolicy, Manual};

const ENTRY_EXTENSION: &str = "entry";

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Outcome of a cache lookup.
#[derive(Debug)]
pub enum Lookup {
    /// A fresh entry was found.
    Hit(Vec<u8>),
    /// No entry exists.
    Miss,
    /// An entry exists but the policy considers it outdated.
    Stale,
    /// The entry could not be read or was corrupt.
    Unavailable(anyhow::Error),
}

/// File-backed storage for rendered probe output.
#[derive(Debug)]
pub struct CacheStore {
    /// Root directory for cache.
    root: PathBuf,
    /// Freshness strategy.
    policy: Box<dyn InvalidationPolicy>,
}

impl CacheStore {
    /// Create a new cache store with the [`Manual`] policy.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: Box::new(Manual),
        }
    }

    /// Replace the invalidation policy.
    pub fn with_policy(mut self, policy: Box<dyn InvalidationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the active invalidation policy.
    pub fn policy(&self) -> &dyn InvalidationPolicy {
        self.policy.as_ref()
    }

    /// Directory holding every entry of one probe.
    pub fn probe_dir(&self, probe_key: &str) -> PathBuf {
        let hash = Sha256::digest(probe_key.as_bytes());
        self.root.join(hex::encode(&hash[..16]))
    }

    /// Get the path of an entry.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.probe_dir(&key.probe_key)
            .join(format!("{}.{}", key.arg_count, ENTRY_EXTENSION))
    }

    /// Look up an entry, reporting why nothing was served.
    ///
    /// `fingerprint` is the current pattern fingerprint, passed through to
    /// the policy.
    pub fn lookup(&self, key: &CacheKey, fingerprint: Option<&str>) -> Lookup {
        let path = self.entry_path(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Lookup::Miss,
            Err(e) => {
                return Lookup::Unavailable(
                    anyhow::Error::new(e)
                        .context(format!("Failed to read cache entry {:?}", path)),
                )
            }
        };

        let entry = match CacheEntry::decode(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                return Lookup::Unavailable(e.context(format!("Corrupt cache entry {:?}", path)))
            }
        };

        if !entry.header.matches(key) {
            return Lookup::Unavailable(anyhow::anyhow!(
                "Cache entry {:?} belongs to {}",
                path,
                entry.header.key()
            ));
        }

        if !self.policy.is_fresh(&entry.header, fingerprint) {
            return Lookup::Stale;
        }

        Lookup::Hit(entry.payload)
    }

    /// Read a cached payload.
    ///
    /// Returns `None` on a miss, on a stale entry, and on any I/O failure:
    /// the cache only ever saves work, it never causes an error.
    pub fn try_read(&self, probe_key: &str, arg_count: u32) -> Option<Vec<u8>> {
        let key = CacheKey::new(probe_key, arg_count);
        match self.lookup(&key, None) {
            Lookup::Hit(payload) => {
                tracing::debug!("Cache hit for {}", key);
                Some(payload)
            }
            Lookup::Miss | Lookup::Stale => {
                tracing::debug!("Cache miss for {}", key);
                None
            }
            Lookup::Unavailable(e) => {
                tracing::warn!("Cache unavailable for {}: {:#}", key, e);
                None
            }
        }
    }

    /// Store a payload, replacing any previous entry for the same key.
    pub fn write(&self, probe_key: &str, arg_count: u32, payload: &[u8]) -> Result<()> {
        let entry = CacheEntry::new(&CacheKey::new(probe_key, arg_count), payload);
        self.write_entry(&entry)
    }

    /// Store a prepared entry.
    ///
    /// Uses the write-to-temp-then-rename pattern, so readers observe either
    /// the previous entry or the new one in full. Every writer uses its own
    /// temp file; concurrent writers race only at the rename.
    pub fn write_entry(&self, entry: &CacheEntry) -> Result<()> {
        let key = entry.header.key();
        let dir = self.probe_dir(&key.probe_key);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {:?}", dir))?;

        let path = self.entry_path(&key);
        let temp_path = dir.join(format!(
            ".{}.{}.{}.tmp",
            key.arg_count,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let bytes = entry.encode()?;
        publish(&temp_path, &path, |file| file.write_all(&bytes))?;

        tracing::debug!("Cached {} ({} bytes)", key, entry.payload.len());
        Ok(())
    }

    /// Remove one entry.
    pub fn remove(&self, probe_key: &str, arg_count: u32) -> Result<bool> {
        let path = self.entry_path(&CacheKey::new(probe_key, arg_count));

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to remove {:?}", path))),
        }
    }

    /// Remove every entry of a probe, whatever its argument count.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, probe_key: &str) -> Result<usize> {
        let dir = self.probe_dir(probe_key);
        if !dir.is_dir() {
            return Ok(0);
        }

        let count = entry_files(&dir)?.len();
        fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to remove cache directory {:?}", dir))?;

        tracing::debug!("Invalidated {} entries for {}", count, probe_key);
        Ok(count)
    }

    /// List all cached entry headers, newest first.
    ///
    /// Unreadable or corrupt entries are skipped.
    pub fn list(&self) -> Result<Vec<EntryHeader>> {
        let mut headers = Vec::new();

        if !self.root.is_dir() {
            return Ok(headers);
        }

        for dir in fs::read_dir(&self.root)? {
            let dir = dir?.path();
            if !dir.is_dir() {
                continue;
            }

            for path in entry_files(&dir)? {
                if let Ok(bytes) = fs::read(&path) {
                    if let Ok(entry) = CacheEntry::decode(&bytes) {
                        headers.push(entry.header);
                    }
                }
            }
        }

        headers.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(headers)
    }

    /// Remove every probe directory under the root, readable or not.
    ///
    /// Returns the number of entry files removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.root.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for dir in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read cache directory {:?}", self.root))?
        {
            let dir = dir?.path();
            if !dir.is_dir() {
                continue;
            }

            let count = entry_files(&dir)?.len();
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove cache directory {:?}", dir))?;
            removed += count;
        }

        tracing::debug!("Cleared {} entries from {:?}", removed, self.root);
        Ok(removed)
    }

    /// Remove entries the policy no longer considers fresh.
    pub fn prune(&self) -> Result<usize> {
        let mut removed = 0;

        for header in self.list()? {
            if !self.policy.is_fresh(&header, None)
                && self.remove(&header.probe_key, header.arg_count)?
            {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Get total payload size in bytes.
    pub fn total_size(&self) -> Result<u64> {
        let headers = self.list()?;
        Ok(headers.iter().map(|h| h.size_bytes).sum())
    }
}

/// Fill `temp_path` and rename it over `path`.
///
/// The temp file is removed again if either step fails.
fn publish<F>(temp_path: &Path, path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    if let Err(e) = fs::File::create(temp_path).and_then(|mut file| fill(&mut file)) {
        let _ = fs::remove_file(temp_path);
        return Err(
            anyhow::Error::new(e).context(format!("Failed to write cache entry {:?}", temp_path))
        );
    }

    if let Err(e) = fs::rename(temp_path, path) {
        let _ = fs::remove_file(temp_path);
        return Err(
            anyhow::Error::new(e).context(format!("Failed to publish cache entry {:?}", path))
        );
    }

    Ok(())
}

/// Published entry files in a probe directory (temp files excluded).
fn entry_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == ENTRY_EXTENSION) {
            files.push(path);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::policy::{fingerprint, MaxAge, PatternDigest};
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_test_store() -> (TempDir, CacheStore) {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn cache_store_creation() {
        let (temp, store) = setup_test_store();

        assert_eq!(store.root(), temp.path());
        assert_eq!(store.policy().name(), "manual");
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"en_US.UTF-8").unwrap();

        assert_eq!(store.try_read("Locale", 1), Some(b"en_US.UTF-8".to_vec()));
    }

    #[test]
    fn writing_twice_is_idempotent() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"en_US.UTF-8").unwrap();
        store.write("Locale", 1, b"en_US.UTF-8").unwrap();

        assert_eq!(store.try_read("Locale", 1), Some(b"en_US.UTF-8".to_vec()));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn write_replaces_previous_payload() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"C").unwrap();
        store.write("Locale", 1, b"de_DE.UTF-8").unwrap();

        assert_eq!(store.try_read("Locale", 1), Some(b"de_DE.UTF-8".to_vec()));
    }

    #[test]
    fn read_missing_returns_none() {
        let (_temp, store) = setup_test_store();

        assert_eq!(store.try_read("Locale", 1), None);
        assert!(matches!(
            store.lookup(&CacheKey::new("Locale", 1), None),
            Lookup::Miss
        ));
    }

    #[test]
    fn arg_count_separates_entries() {
        let (_temp, store) = setup_test_store();

        store.write("DateTime", 1, b"terse").unwrap();
        store.write("DateTime", 3, b"verbose").unwrap();

        assert_eq!(store.try_read("DateTime", 1), Some(b"terse".to_vec()));
        assert_eq!(store.try_read("DateTime", 3), Some(b"verbose".to_vec()));
        assert_eq!(store.try_read("DateTime", 2), None);
    }

    #[test]
    fn unreadable_root_degrades_to_miss() {
        let temp = TempDir::new().unwrap();
        // A regular file where the root directory should be
        let root = temp.path().join("not-a-dir");
        fs::write(&root, "x").unwrap();
        let store = CacheStore::new(&root);

        assert_eq!(store.try_read("Locale", 1), None);
        assert!(store.write("Locale", 1, b"x").is_err());
    }

    #[test]
    fn corrupt_entry_is_unavailable() {
        let (_temp, store) = setup_test_store();
        let key = CacheKey::new("Locale", 1);
        store.write("Locale", 1, b"en_US.UTF-8").unwrap();
        fs::write(store.entry_path(&key), b"garbage").unwrap();

        assert!(matches!(store.lookup(&key, None), Lookup::Unavailable(_)));
        assert_eq!(store.try_read("Locale", 1), None);
    }

    #[test]
    fn misplaced_entry_is_unavailable() {
        let (_temp, store) = setup_test_store();
        let key = CacheKey::new("Locale", 1);
        let foreign = CacheEntry::new(&CacheKey::new("GPU", 1), "Apple M1");
        fs::create_dir_all(store.probe_dir("Locale")).unwrap();
        fs::write(store.entry_path(&key), foreign.encode().unwrap()).unwrap();

        assert!(matches!(store.lookup(&key, None), Lookup::Unavailable(_)));
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"en_US.UTF-8").unwrap();

        let names: Vec<_> = fs::read_dir(store.probe_dir("Locale"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["1.entry".to_string()]);
    }

    #[test]
    fn concurrent_writers_never_expose_partial_entries() {
        let (_temp, store) = setup_test_store();
        let store = Arc::new(store);
        let payloads: Vec<Vec<u8>> = (0..4).map(|i| vec![b'a' + i; 4096]).collect();

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        store.write("Media", 4, &payload).unwrap();
                        if let Some(read) = store.try_read("Media", 4) {
                            assert_eq!(read.len(), 4096);
                            assert!(read.iter().all(|&b| b == read[0]));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let last = store.try_read("Media", 4).unwrap();
        assert!(payloads.contains(&last));
    }

    #[test]
    fn remove_entry() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"x").unwrap();

        assert!(store.remove("Locale", 1).unwrap());
        assert_eq!(store.try_read("Locale", 1), None);
    }

    #[test]
    fn remove_nonexistent_returns_false() {
        let (_temp, store) = setup_test_store();

        assert!(!store.remove("Locale", 1).unwrap());
    }

    #[test]
    fn invalidate_removes_all_arg_counts() {
        let (_temp, store) = setup_test_store();

        store.write("DateTime", 1, b"a").unwrap();
        store.write("DateTime", 3, b"b").unwrap();
        store.write("Locale", 1, b"c").unwrap();

        assert_eq!(store.invalidate("DateTime").unwrap(), 2);
        assert_eq!(store.try_read("DateTime", 1), None);
        assert_eq!(store.try_read("DateTime", 3), None);
        assert_eq!(store.try_read("Locale", 1), Some(b"c".to_vec()));
    }

    #[test]
    fn invalidate_unknown_probe_is_noop() {
        let (_temp, store) = setup_test_store();

        assert_eq!(store.invalidate("Nothing").unwrap(), 0);
    }

    #[test]
    fn list_entries() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"en_US.UTF-8").unwrap();
        store.write("GPU", 2, b"Apple M1").unwrap();

        let headers = store.list().unwrap();
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().any(|h| h.probe_key == "GPU" && h.arg_count == 2));
    }

    #[test]
    fn list_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("absent"));

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn clear_cache() {
        let (_temp, store) = setup_test_store();

        store.write("Locale", 1, b"a").unwrap();
        store.write("GPU", 2, b"b").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn total_size_calculation() {
        let (_temp, store) = setup_test_store();

        store.write("A", 1, b"12345").unwrap(); // 5 bytes
        store.write("B", 1, b"1234567890").unwrap(); // 10 bytes

        assert_eq!(store.total_size().unwrap(), 15);
    }

    #[test]
    fn entry_path_is_deterministic() {
        let (_temp, store) = setup_test_store();
        let key = CacheKey::new("Locale", 1);

        assert_eq!(store.entry_path(&key), store.entry_path(&key));
        assert_ne!(
            store.entry_path(&key),
            store.entry_path(&CacheKey::new("Locale", 2))
        );
        assert_ne!(
            store.entry_path(&key),
            store.entry_path(&CacheKey::new("Locales", 1))
        );
    }

    #[test]
    fn stale_entry_is_not_served() {
        let temp = TempDir::new().unwrap();
        let store =
            CacheStore::new(temp.path()).with_policy(Box::new(MaxAge::new(Duration::hours(1))));
        let old = CacheEntry::new(&CacheKey::new("Locale", 1), "C")
            .with_cached_at(Utc::now() - Duration::hours(2));
        store.write_entry(&old).unwrap();

        assert!(matches!(
            store.lookup(&CacheKey::new("Locale", 1), None),
            Lookup::Stale
        ));
        assert_eq!(store.try_read("Locale", 1), None);
    }

    #[test]
    fn prune_removes_stale_entries() {
        let temp = TempDir::new().unwrap();
        let store =
            CacheStore::new(temp.path()).with_policy(Box::new(MaxAge::new(Duration::hours(1))));

        store.write("Fresh", 1, b"a").unwrap();
        let old = CacheEntry::new(&CacheKey::new("Stale", 1), "b")
            .with_cached_at(Utc::now() - Duration::hours(2));
        store.write_entry(&old).unwrap();

        assert_eq!(store.prune().unwrap(), 1);

        let headers = store.list().unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].probe_key, "Fresh");
    }

    #[test]
    fn pattern_digest_policy_checks_fingerprint() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path()).with_policy(Box::new(PatternDigest));
        let key = CacheKey::new("Locale", 1);
        let entry = CacheEntry::new(&key, "en_US.UTF-8").with_fingerprint(fingerprint("{1}"));
        store.write_entry(&entry).unwrap();

        assert!(matches!(
            store.lookup(&key, Some(&fingerprint("{1}"))),
            Lookup::Hit(_)
        ));
        assert!(matches!(
            store.lookup(&key, Some(&fingerprint("LANG={1}"))),
            Lookup::Stale
        ));
    }

    fn leftover_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[test]
    fn clear_removes_unreadable_entries_and_temp_files() {
        let (temp, store) = setup_test_store();
        let dir = store.probe_dir("Locale");
        fs::create_dir_all(&dir).unwrap();
        fs::write(store.entry_path(&CacheKey::new("Locale", 1)), b"junk").unwrap();
        fs::write(dir.join(".1.99.0.tmp"), b"partial").unwrap();
        store.write("GPU", 2, b"Apple M1").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(!dir.exists());
        assert!(leftover_files(temp.path()).is_empty());
    }

    #[test]
    fn clear_missing_root_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("absent"));

        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn failed_fill_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let temp_path = temp.path().join(".1.1.0.tmp");
        let path = temp.path().join("1.entry");

        let result = publish(&temp_path, &path, |file| {
            file.write_all(b"half an ent")?;
            Err(io::Error::new(ErrorKind::Other, "no space left on device"))
        });

        assert!(format!("{:#}", result.unwrap_err()).contains("no space left"));
        assert!(leftover_files(temp.path()).is_empty());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let temp_path = temp.path().join(".1.1.0.tmp");
        let path = temp.path().join("1.entry");
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(publish(&temp_path, &path, |file| file.write_all(b"x")).is_err());
        assert!(!temp_path.exists());
    }
}
