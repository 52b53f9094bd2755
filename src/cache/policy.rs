//! Cache invalidation strategies.
//!
//! The store never guesses when a result is outdated. It asks the
//! [`InvalidationPolicy`] it was built with:
//!
//! - [`Manual`] (default) - entries stay fresh until removed explicitly
//! - [`MaxAge`] - entries expire a fixed time after they were written
//! - [`PatternDigest`] - entries expire when the configured pattern changes

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

use super::EntryHeader;

/// Decides whether a stored entry may still be served.
pub trait InvalidationPolicy: std::fmt::Debug + Send + Sync {
    /// Short name for display.
    fn name(&self) -> &'static str;

    /// Check whether `header` is fresh.
    ///
    /// `fingerprint` is the fingerprint of the pattern the caller would
    /// render with now, when it has one.
    fn is_fresh(&self, header: &EntryHeader, fingerprint: Option<&str>) -> bool;

    /// Time left before `header` expires, for policies that expire by age.
    fn remaining(&self, _header: &EntryHeader) -> Option<Duration> {
        None
    }
}

/// Entries never go stale on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manual;

impl InvalidationPolicy for Manual {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn is_fresh(&self, _header: &EntryHeader, _fingerprint: Option<&str>) -> bool {
        true
    }
}

/// Entries expire `max_age` after they were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAge {
    max_age: Duration,
}

impl MaxAge {
    /// Create a TTL policy.
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// The configured TTL.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl InvalidationPolicy for MaxAge {
    fn name(&self) -> &'static str {
        "ttl"
    }

    fn is_fresh(&self, header: &EntryHeader, _fingerprint: Option<&str>) -> bool {
        header.age() < self.max_age
    }

    /// Clamped at zero once expired.
    fn remaining(&self, header: &EntryHeader) -> Option<Duration> {
        let expires_at = header.cached_at + self.max_age;
        Some(
            expires_at
                .signed_duration_since(Utc::now())
                .max(Duration::zero()),
        )
    }
}

/// Entries expire when the pattern they were rendered from changes.
///
/// Lookups without a fingerprint (e.g. `prune`) cannot compare and treat
/// the entry as fresh. Entries written without a fingerprint are stale as
/// soon as a fingerprint is supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternDigest;

impl InvalidationPolicy for PatternDigest {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn is_fresh(&self, header: &EntryHeader, fingerprint: Option<&str>) -> bool {
        match fingerprint {
            Some(expected) => header.fingerprint.as_deref() == Some(expected),
            None => true,
        }
    }
}

/// Fingerprint of a pattern string, as recorded in entry headers.
pub fn fingerprint(pattern: &str) -> String {
    let hash = Sha256::digest(pattern.as_bytes());
    hex::encode(&hash[..16])
}

/// Parse a TTL string like "7d", "24h", "30m".
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let (number, unit) = match ttl.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&ttl[..i], c),
        _ => (ttl.as_str(), 's'),
    };

    let n: i64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid TTL '{}'", ttl))?;

    match unit {
        'd' => Ok(Duration::days(n)),
        'h' => Ok(Duration::hours(n)),
        'm' => Ok(Duration::minutes(n)),
        's' => Ok(Duration::seconds(n)),
        other => anyhow::bail!("Unknown TTL unit '{}' in '{}'", other, ttl),
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, CacheKey};

    fn header_aged(age: Duration) -> EntryHeader {
        CacheEntry::new(&CacheKey::new("Locale", 1), "x")
            .with_cached_at(Utc::now() - age)
            .header
    }

    #[test]
    fn manual_is_always_fresh() {
        let header = header_aged(Duration::days(3650));
        assert!(Manual.is_fresh(&header, None));
        assert!(Manual.is_fresh(&header, Some("anything")));
    }

    #[test]
    fn max_age_keeps_young_entries() {
        let policy = MaxAge::new(Duration::hours(1));
        assert!(policy.is_fresh(&header_aged(Duration::minutes(5)), None));
    }

    #[test]
    fn max_age_expires_old_entries() {
        let policy = MaxAge::new(Duration::hours(1));
        assert!(!policy.is_fresh(&header_aged(Duration::hours(2)), None));
    }

    #[test]
    fn zero_max_age_expires_immediately() {
        let policy = MaxAge::new(Duration::zero());
        assert!(!policy.is_fresh(&header_aged(Duration::zero()), None));
    }

    #[test]
    fn max_age_remaining_is_clamped() {
        let policy = MaxAge::new(Duration::hours(1));
        assert_eq!(
            policy.remaining(&header_aged(Duration::hours(5))),
            Some(Duration::zero())
        );
        let remaining = policy.remaining(&header_aged(Duration::zero())).unwrap();
        assert!(remaining.num_seconds() > 3590);
    }

    #[test]
    fn only_max_age_reports_remaining() {
        let header = header_aged(Duration::zero());
        assert_eq!(Manual.remaining(&header), None);
        assert_eq!(PatternDigest.remaining(&header), None);
    }

    #[test]
    fn pattern_digest_compares_fingerprints() {
        let mut header = header_aged(Duration::zero());
        header.fingerprint = Some(fingerprint("{1}"));

        assert!(PatternDigest.is_fresh(&header, Some(&fingerprint("{1}"))));
        assert!(!PatternDigest.is_fresh(&header, Some(&fingerprint("{1} ({2})"))));
        assert!(PatternDigest.is_fresh(&header, None));
    }

    #[test]
    fn pattern_digest_rejects_unstamped_entries() {
        let header = header_aged(Duration::zero());
        assert!(!PatternDigest.is_fresh(&header, Some(&fingerprint("{1}"))));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("{1}"), fingerprint("{1}"));
        assert_ne!(fingerprint("{1}"), fingerprint("{2}"));
        assert_eq!(fingerprint("{1}").len(), 32);
    }

    #[test]
    fn parse_ttl_days() {
        assert_eq!(parse_ttl("7d").unwrap().num_days(), 7);
    }

    #[test]
    fn parse_ttl_hours() {
        assert_eq!(parse_ttl("24h").unwrap().num_hours(), 24);
    }

    #[test]
    fn parse_ttl_minutes() {
        assert_eq!(parse_ttl("30m").unwrap().num_minutes(), 30);
    }

    #[test]
    fn parse_ttl_seconds() {
        assert_eq!(parse_ttl("3600s").unwrap().num_seconds(), 3600);
    }

    #[test]
    fn parse_ttl_no_suffix() {
        assert_eq!(parse_ttl("3600").unwrap().num_seconds(), 3600);
    }

    #[test]
    fn parse_ttl_rejects_garbage() {
        assert!(parse_ttl("soon").is_err());
        assert!(parse_ttl("5w").is_err());
        assert!(parse_ttl("").is_err());
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(Duration::days(7)), "7d");
        assert_eq!(format_duration(Duration::hours(12)), "12h");
        assert_eq!(format_duration(Duration::minutes(30)), "30m");
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
    }

    #[test]
    fn policy_names() {
        assert_eq!(Manual.name(), "manual");
        assert_eq!(MaxAge::new(Duration::hours(1)).name(), "ttl");
        assert_eq!(PatternDigest.name(), "pattern");
    }
}
