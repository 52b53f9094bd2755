//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format:
//!
//! ```yaml
//! cache:
//!   invalidation: ttl
//!   ttl: 7d
//! display:
//!   separator: " -> "
//! modules:
//!   Locale:
//!     key: Lang
//!     format: "{1}"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::cache::{
    default_cache_dir, parse_ttl, InvalidationPolicy, Manual, MaxAge, PatternDigest,
};
use crate::error::{InfolineError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Result cache settings
    pub cache: CacheSettings,

    /// Output line settings
    pub display: DisplaySettings,

    /// Per-module key and format overrides, keyed by probe name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub modules: HashMap<String, ModuleConfig>,
}

impl Config {
    /// Overrides for one module, if configured.
    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.get(name)
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Read and write cached module output
    pub enabled: bool,

    /// Cache directory (defaults to the platform cache dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// When cached output goes stale
    pub invalidation: InvalidationMode,

    /// Entry lifetime for `invalidation: ttl` (e.g. "7d", "12h")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            invalidation: InvalidationMode::Manual,
            ttl: None,
        }
    }
}

impl CacheSettings {
    /// The configured cache directory, or the platform default.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Build the invalidation policy these settings describe.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` if `ttl` is missing, malformed, or negative
    /// while `invalidation` is `ttl`.
    pub fn policy(&self) -> Result<Box<dyn InvalidationPolicy>> {
        match self.invalidation {
            InvalidationMode::Manual => Ok(Box::new(Manual)),
            InvalidationMode::Pattern => Ok(Box::new(PatternDigest)),
            InvalidationMode::Ttl => {
                let raw = self
                    .ttl
                    .as_deref()
                    .ok_or_else(|| InfolineError::InvalidSetting {
                        key: "cache.ttl".to_string(),
                        message: "required when invalidation is 'ttl'".to_string(),
                    })?;

                let max_age = parse_ttl(raw).map_err(|e| InfolineError::InvalidSetting {
                    key: "cache.ttl".to_string(),
                    message: e.to_string(),
                })?;

                if max_age < chrono::Duration::zero() {
                    return Err(InfolineError::InvalidSetting {
                        key: "cache.ttl".to_string(),
                        message: "must not be negative".to_string(),
                    });
                }

                Ok(Box::new(MaxAge::new(max_age)))
            }
        }
    }
}

/// Cache invalidation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationMode {
    /// Entries stay until `infoline cache invalidate` or `clear`
    #[default]
    Manual,
    /// Entries expire after `ttl`
    Ttl,
    /// Entries expire when the module's format string changes
    Pattern,
}

/// Output line settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Text between a module's key and its value
    pub separator: String,

    /// Print a line for modules that failed
    pub show_errors: bool,

    /// Color name for keys (e.g. "blue", "magenta")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_color: Option<String>,

    /// Style keys at all
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            separator: ": ".to_string(),
            show_errors: true,
            key_color: None,
            color: true,
        }
    }
}

/// Per-module overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Label printed before the value (defaults to the probe name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Format string, e.g. "{1} ({2})"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_manual_cache() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.invalidation, InvalidationMode::Manual);
        assert_eq!(config.display.separator, ": ");
        assert!(config.display.show_errors);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
cache:
  enabled: false
  dir: /tmp/infoline
  invalidation: ttl
  ttl: 12h
display:
  separator: " = "
  show_errors: false
  key_color: blue
modules:
  Locale:
    key: Lang
    format: "{1}"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/infoline")));
        assert_eq!(config.cache.invalidation, InvalidationMode::Ttl);
        assert_eq!(config.display.separator, " = ");
        assert_eq!(config.display.key_color.as_deref(), Some("blue"));

        let locale = config.module("Locale").unwrap();
        assert_eq!(locale.key.as_deref(), Some("Lang"));
        assert_eq!(locale.format.as_deref(), Some("{1}"));
        assert!(config.module("GPU").is_none());
    }

    #[test]
    fn manual_policy_by_default() {
        let policy = CacheSettings::default().policy().unwrap();
        assert_eq!(policy.name(), "manual");
    }

    #[test]
    fn pattern_policy() {
        let settings = CacheSettings {
            invalidation: InvalidationMode::Pattern,
            ..Default::default()
        };
        assert_eq!(settings.policy().unwrap().name(), "pattern");
    }

    #[test]
    fn ttl_policy_requires_ttl() {
        let settings = CacheSettings {
            invalidation: InvalidationMode::Ttl,
            ..Default::default()
        };
        assert!(matches!(
            settings.policy(),
            Err(InfolineError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn ttl_policy_parses_duration() {
        let settings = CacheSettings {
            invalidation: InvalidationMode::Ttl,
            ttl: Some("7d".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.policy().unwrap().name(), "ttl");
    }

    #[test]
    fn ttl_policy_rejects_bad_duration() {
        for ttl in ["soon", "-5m"] {
            let settings = CacheSettings {
                invalidation: InvalidationMode::Ttl,
                ttl: Some(ttl.to_string()),
                ..Default::default()
            };
            assert!(settings.policy().is_err(), "accepted {}", ttl);
        }
    }

    #[test]
    fn resolved_dir_prefers_override() {
        let settings = CacheSettings {
            dir: Some(PathBuf::from("/var/cache/x")),
            ..Default::default()
        };
        assert_eq!(settings.resolved_dir(), PathBuf::from("/var/cache/x"));
        assert!(CacheSettings::default()
            .resolved_dir()
            .ends_with("infoline"));
    }
}
