//! Configuration file loading.

use crate::config::schema::Config;
use crate::error::{InfolineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config location: `<user config dir>/infoline/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("infoline").join("config.yml"))
}

/// Load configuration from an explicit path.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file does not exist and
/// `ConfigParseError` if it is not valid config YAML.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(InfolineError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Load the default config file if present, otherwise built-in defaults.
pub fn load_default_config() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!("Loading config from {}", path.display());
            load_config(&path)
        }
        _ => Ok(Config::default()),
    }
}

/// Parse config YAML. `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(content).map_err(|e| InfolineError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_config_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "display:\n  separator: ' | '\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.display.separator, " | ");
    }

    #[test]
    fn load_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&temp.path().join("absent.yml"));

        assert!(matches!(result, Err(InfolineError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_reports_path_on_error() {
        let err = parse_config("cache: [not, a, map]", Path::new("/x/config.yml")).unwrap_err();

        assert!(matches!(err, InfolineError::ConfigParseError { .. }));
        assert!(err.to_string().contains("/x/config.yml"));
    }

    #[test]
    fn parse_empty_config_is_default() {
        let config = parse_config("   \n", Path::new("config.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn default_config_path_is_namespaced() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("infoline/config.yml"));
        }
    }
}
