//! Process-level settings loaded from `zime.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ZimeError;
use crate::runtime::home_dir;

/// Frontend and bootstrap options.
///
/// Schema behaviour itself lives in the store; this file only says where
/// the store is and how the host should present things.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Candidates shown per lookup-table page.
    pub page_size: usize,

    /// Explicit database path; when unset the default location is resolved
    /// from the environment.
    pub database: Option<PathBuf>,

    /// Schema to select at startup instead of the most recently used one.
    pub default_schema: Option<String>,

    /// `tracing` filter directive, e.g. `"zime_core=debug"`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 5,
            database: None,
            default_schema: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "zime.toml";

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ZimeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ZimeError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ZimeError> {
        let config: Config = toml::from_str(content)?;
        if config.page_size == 0 || config.page_size > 9 {
            return Err(ZimeError::InvalidConfig {
                key: "page_size".to_string(),
                value: config.page_size.to_string(),
            });
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ZimeError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `./zime.toml`, then `~/.zime/zime.toml`, then defaults.
    pub fn load_default() -> Result<Self, ZimeError> {
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading config");
                return Self::load_toml(candidate);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> [PathBuf; 2] {
        [
            PathBuf::from(Self::FILE_NAME),
            home_dir().join(".zime").join(Self::FILE_NAME),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = Config::from_toml_str("default_schema = \"roman\"\n").unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.default_schema.as_deref(), Some("roman"));
        assert_eq!(config.database, None);
    }

    #[test]
    fn page_size_is_bounded_by_digit_keys() {
        assert!(matches!(
            Config::from_toml_str("page_size = 12"),
            Err(ZimeError::InvalidConfig { .. })
        ));
        assert!(Config::from_toml_str("page_size = 0").is_err());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zime.toml");
        let config = Config {
            page_size: 7,
            database: Some(dir.path().join("zime.db")),
            log_filter: Some("zime_core=debug".into()),
            ..Config::default()
        };
        config.save_toml(&path).unwrap();
        assert_eq!(Config::load_toml(&path).unwrap(), config);
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            Config::from_toml_str("page_size = \"five\""),
            Err(ZimeError::Toml(_))
        ));
    }
}
