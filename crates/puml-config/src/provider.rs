//! Configuration providers.
//!
//! Each provider loads a [`PartialConfig`] from one source. A missing rc
//! file is not an error (the provider simply contributes nothing); an
//! unreadable or malformed file is.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{CONFIG_FILENAME, ConfigError};

/// A subset of configuration values read from one source.
///
/// All fields optional; `engine` and `format` are kept as strings here and
/// validated during the merge.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub engine: Option<String>,
    pub format: Option<String>,
    pub server: Option<String>,
    pub use_cache: Option<bool>,
    pub cache_dir: Option<String>,
}

/// A source of partial configuration values.
pub trait ConfigProvider {
    /// Load this provider's overrides.
    ///
    /// Providers whose source is absent return an empty partial rather
    /// than an error.
    fn load(&self) -> Result<PartialConfig, ConfigError>;
}

/// Reads an rc file at an explicit path. `~` is expanded.
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
        Self {
            path: PathBuf::from(expanded),
        }
    }
}

impl ConfigProvider for FileProvider {
    fn load(&self) -> Result<PartialConfig, ConfigError> {
        if !self.path.is_file() {
            tracing::info!("rc file {} does not exist", self.path.display());
            return Ok(PartialConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Reads the per-user rc file from the home directory.
pub struct HomeProvider;

impl ConfigProvider for HomeProvider {
    fn load(&self) -> Result<PartialConfig, ConfigError> {
        FileProvider::new(format!("~/{CONFIG_FILENAME}")).load()
    }
}

/// Reads a per-project rc file by walking up from a starting directory.
///
/// The nearest `.pumlrc` in the starting directory or any of its ancestors
/// wins, so repository-level overrides apply from anywhere inside the tree.
pub struct RepoRootProvider {
    start: PathBuf,
}

impl RepoRootProvider {
    /// Search upwards from the current working directory.
    #[must_use]
    pub fn from_cwd() -> Self {
        Self {
            start: std::env::current_dir().unwrap_or_default(),
        }
    }

    /// Search upwards from an explicit directory.
    #[must_use]
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
        }
    }

    /// Find the nearest rc file at or above the starting directory.
    fn discover(&self) -> Option<PathBuf> {
        let mut current = self.start.clone();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }
}

impl ConfigProvider for RepoRootProvider {
    fn load(&self) -> Result<PartialConfig, ConfigError> {
        match self.discover() {
            Some(path) => FileProvider::new(path).load(),
            None => Ok(PartialConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_provider_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let provider = FileProvider::new(tmp.path().join("absent.json"));

        let partial = provider.load().unwrap();
        assert!(partial.engine.is_none());
        assert!(partial.server.is_none());
    }

    #[test]
    fn test_file_provider_reads_json() {
        let tmp = TempDir::new().unwrap();
        let rc = tmp.path().join("rc.json");
        fs::write(&rc, r#"{"engine": "graphviz", "use_cache": true}"#).unwrap();

        let partial = FileProvider::new(&rc).load().unwrap();
        assert_eq!(partial.engine.as_deref(), Some("graphviz"));
        assert_eq!(partial.use_cache, Some(true));
        assert!(partial.format.is_none());
    }

    #[test]
    fn test_file_provider_malformed_json_is_error() {
        let tmp = TempDir::new().unwrap();
        let rc = tmp.path().join("rc.json");
        fs::write(&rc, "{ not json").unwrap();

        let err = FileProvider::new(&rc).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_file_provider_unknown_key_is_error() {
        let tmp = TempDir::new().unwrap();
        let rc = tmp.path().join("rc.json");
        fs::write(&rc, r#"{"serverr": "http://typo.example"}"#).unwrap();

        let err = FileProvider::new(&rc).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_repo_root_provider_finds_nearest_rc() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), r#"{"format": "png"}"#).unwrap();

        let partial = RepoRootProvider::new(&nested).load().unwrap();
        assert_eq!(partial.format.as_deref(), Some("png"));
    }

    #[test]
    fn test_repo_root_provider_nearest_wins() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), r#"{"format": "png"}"#).unwrap();
        fs::write(nested.join(CONFIG_FILENAME), r#"{"format": "svg"}"#).unwrap();

        let partial = RepoRootProvider::new(&nested).load().unwrap();
        assert_eq!(partial.format.as_deref(), Some("svg"));
    }

    #[test]
    fn test_repo_root_provider_without_rc_is_empty() {
        let tmp = TempDir::new().unwrap();
        let partial = RepoRootProvider::new(tmp.path()).load().unwrap();
        assert!(partial.format.is_none());
        assert!(partial.cache_dir.is_none());
    }
}
