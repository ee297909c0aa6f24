//! Configuration management for puml.
//!
//! Defaults are layered from a list of [`ConfigProvider`]s, later providers
//! overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `~/.pumlrc` (per-user)
//! 3. `.pumlrc` found by walking up from the current directory (per-project)
//!
//! Rc files are JSON objects with any subset of the keys `engine`, `format`,
//! `server`, `use_cache` and `cache_dir`:
//!
//! ```json
//! {
//!     "server": "http://localhost:8080/plantuml/",
//!     "use_cache": false
//! }
//! ```
//!
//! The merged result is an immutable [`Config`] with every field resolved
//! (strings parsed into the render crate's types, `~` expanded in
//! `cache_dir`). Nothing is memoized: reloading is an explicit call to
//! [`Config::load`] again.

mod provider;

use std::path::PathBuf;

use puml_render::{DEFAULT_SERVER_URL, Engine, ImageFormat};

pub use provider::{ConfigProvider, FileProvider, HomeProvider, PartialConfig, RepoRootProvider};

/// Configuration filename searched for by the default providers.
pub const CONFIG_FILENAME: &str = ".pumlrc";

/// Default cache directory, before `~` expansion.
const DEFAULT_CACHE_DIR: &str = "~/.cache/puml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the default engine.
    pub engine: Option<Engine>,
    /// Override the default output format.
    pub format: Option<ImageFormat>,
    /// Override the server URL.
    pub server: Option<String>,
    /// Override the cache enabled flag.
    pub use_cache: Option<bool>,
    /// Override the cache directory (may contain `~`).
    pub cache_dir: Option<String>,
}

/// Resolved application configuration.
///
/// Immutable once loaded; the render core consumes this as a finished value
/// and never participates in provider discovery or merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Engine used when detection finds no `@startXXX` marker.
    pub engine: Engine,
    /// Output format used when none is requested.
    pub format: ImageFormat,
    /// Render server base URL.
    pub server: String,
    /// Whether the content-addressed cache is consulted at all.
    pub use_cache: bool,
    /// Cache directory, tilde-expanded.
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::Plantuml,
            format: ImageFormat::Svg,
            server: DEFAULT_SERVER_URL.to_owned(),
            use_cache: true,
            cache_dir: expand_path(DEFAULT_CACHE_DIR),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found (only for explicitly requested files).
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error reading an rc file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from the default provider chain.
    ///
    /// When `rc_path` is given, it replaces the chain entirely (and missing
    /// is an error); otherwise the per-user and per-project rc files are
    /// layered over the built-in defaults, either being optional.
    ///
    /// CLI settings are applied last and take precedence over everything.
    pub fn load(
        rc_path: Option<&std::path::Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = rc_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            config.apply(&FileProvider::new(path).load()?)?;
        } else {
            config.apply(&HomeProvider.load()?)?;
            config.apply(&RepoRootProvider::from_cwd().load()?)?;
        }

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Merge a partial configuration into this one.
    ///
    /// Unset fields keep their current values; string fields are parsed and
    /// validated here.
    pub fn apply(&mut self, partial: &PartialConfig) -> Result<(), ConfigError> {
        if let Some(engine) = &partial.engine {
            self.engine = Engine::parse(engine).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "unknown engine '{engine}' (valid: plantuml, graphviz, ditaa)"
                ))
            })?;
        }
        if let Some(format) = &partial.format {
            self.format = ImageFormat::parse(format).ok_or_else(|| {
                ConfigError::Validation(format!("unknown format '{format}' (valid: svg, png)"))
            })?;
        }
        if let Some(server) = &partial.server {
            if !server.starts_with("http://") && !server.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "server must start with http:// or https://, got '{server}'"
                )));
            }
            self.server.clone_from(server);
        }
        if let Some(use_cache) = partial.use_cache {
            self.use_cache = use_cache;
        }
        if let Some(cache_dir) = &partial.cache_dir {
            self.cache_dir = expand_path(cache_dir);
        }
        Ok(())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(engine) = settings.engine {
            self.engine = engine;
        }
        if let Some(format) = settings.format {
            self.format = format;
        }
        if let Some(server) = &settings.server {
            self.server.clone_from(server);
        }
        if let Some(use_cache) = settings.use_cache {
            self.use_cache = use_cache;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache_dir = expand_path(cache_dir);
        }
    }
}

/// Expand a leading `~` in a path.
fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
