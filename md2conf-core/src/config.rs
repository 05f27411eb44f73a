//! Configuration parsing and management.

use crate::markdown::resources::{default_remote_prefixes, Locality};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "md2conf.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the md2conf.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Settings that shape a single document conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Prefixes treated as remote in addition to any `scheme:` target.
    #[serde(default = "default_remote_prefixes")]
    pub remote_prefixes: Vec<String>,

    /// Put a `toc` macro at the top of every page.
    #[serde(default)]
    pub table_of_contents: bool,

    /// Pass the fence info string on as the code macro's language.
    #[serde(default = "default_true")]
    pub code_language: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            remote_prefixes: default_remote_prefixes(),
            table_of_contents: false,
            code_language: default_true(),
        }
    }
}

impl ConversionConfig {
    pub fn locality(&self) -> Locality {
        Locality::new(self.remote_prefixes.clone())
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(
            config.conversion.remote_prefixes,
            vec!["http://".to_string(), "https://".to_string()]
        );
        assert!(!config.conversion.table_of_contents);
        assert!(config.conversion.code_language);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("conversion:\n  table_of_contents: true\n").unwrap();
        assert!(config.conversion.table_of_contents);
        assert!(config.conversion.code_language);
        assert_eq!(config.conversion.remote_prefixes.len(), 2);

        let empty = Config::from_yaml("").unwrap();
        assert_eq!(empty.conversion, ConversionConfig::default());
    }

    #[test]
    fn test_locality_from_config() {
        let config = Config::from_yaml("conversion:\n  remote_prefixes: [\"/shared/\"]\n").unwrap();
        let locality = config.conversion.locality();
        assert!(!locality.is_local("/shared/a.png"));
        assert!(!locality.is_local("https://host/a.png"));
        assert!(locality.is_local("img/a.png"));
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("md2conf.yml");
        fs::write(&path, "conversion:\n  table_of_contents: true\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.conversion.table_of_contents);

        let missing = Config::load_or_default(dir.path().join("absent.yml")).unwrap();
        assert!(!missing.conversion.table_of_contents);

        assert!(matches!(
            Config::from_file(dir.path().join("absent.yml")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("conversion: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
