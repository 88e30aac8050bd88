//! Configuration management for DW.
//!
//! Parses `dw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The directory
//! holding the config file is the application base path: relative paths
//! (`docs.directory`, `cache.dir`) are resolved against it.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.directory`
//! - `cache.namespace`
//! - `cache.dir`
//! - `route.prefix`
//! - `vcs.git_binary`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override documentation root directory.
    pub docs_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override `update_all` concurrency.
    pub update_concurrency: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dw.toml";

/// Default TTL for rendered pages.
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Route configuration.
    pub route: RouteConfig,
    /// Version control configuration.
    pub vcs: VcsConfig,
    /// Publisher configuration.
    pub publisher: PublisherConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    directory: Option<String>,
    index_page: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Root directory holding every product.
    pub directory: PathBuf,
    /// Application base path the root was resolved against.
    pub base_dir: PathBuf,
    /// File name (without extension) of a version's landing page.
    pub index_page: String,
}

/// Cache storage backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process memory.
    #[default]
    Memory,
    /// One file per entry under `cache.dir`.
    File,
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    namespace: Option<String>,
    ttl_seconds: Option<u64>,
    backend: CacheBackend,
    dir: Option<String>,
}

/// Resolved cache configuration.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether rendered pages are cached at all.
    pub enabled: bool,
    /// Prefix for every cache key.
    pub namespace: String,
    /// Lifetime of a rendered page entry.
    pub ttl: Duration,
    /// Storage backend.
    pub backend: CacheBackend,
    /// Root directory for the file backend.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "dw.docs".to_owned(),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            backend: CacheBackend::Memory,
            dir: PathBuf::from(".dw/cache"),
        }
    }
}

/// Route configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Base path prepended when rewriting intra-doc links.
    pub prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            prefix: "docs".to_owned(),
        }
    }
}

/// Version control configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    /// Primary branch cloned on first publish.
    pub default_branch: String,
    /// Git executable.
    pub git_binary: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            default_branch: "master".to_owned(),
            git_binary: "git".to_owned(),
        }
    }
}

/// Publisher configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Number of products `update_all` refreshes at once (1 = sequential).
    pub update_concurrency: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            update_concurrency: 1,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.directory`").
        field: String,
        /// Error message (e.g., "${`DOCS_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dw.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Create default config with paths relative to `base`.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let cache = CacheConfig {
            dir: base.join(".dw/cache"),
            ..CacheConfig::default()
        };
        Self {
            docs: DocsConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            route: RouteConfig::default(),
            vcs: VcsConfig::default(),
            publisher: PublisherConfig::default(),
            docs_resolved: DocsConfig {
                directory: base.join("docs"),
                base_dir: base.to_path_buf(),
                index_page: "documentation".to_owned(),
            },
            cache_resolved: cache,
            config_path: None,
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.docs_resolved.index_page, "docs.index_page")?;
        require_non_empty(&self.cache_resolved.namespace, "cache.namespace")?;
        if self.cache_resolved.ttl.is_zero() {
            return Err(ConfigError::Validation(
                "cache.ttl_seconds must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.vcs.default_branch, "vcs.default_branch")?;
        require_non_empty(&self.vcs.git_binary, "vcs.git_binary")?;
        if self.publisher.update_concurrency == 0 {
            return Err(ConfigError::Validation(
                "publisher.update_concurrency must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.docs_dir {
            self.docs_resolved.directory.clone_from(dir);
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
        if let Some(concurrency) = settings.update_concurrency {
            self.publisher.update_concurrency = concurrency;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.docs.directory {
            self.docs.directory = Some(expand::expand_env(dir, "docs.directory")?);
        }
        if let Some(ref namespace) = self.cache.namespace {
            self.cache.namespace = Some(expand::expand_env(namespace, "cache.namespace")?);
        }
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand_env(dir, "cache.dir")?);
        }
        self.route.prefix = expand::expand_env(&self.route.prefix, "route.prefix")?;
        self.vcs.git_binary = expand::expand_env(&self.vcs.git_binary, "vcs.git_binary")?;
        Ok(())
    }

    /// Resolve raw values against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        let defaults = CacheConfig::default();

        self.docs_resolved = DocsConfig {
            directory: resolve(self.docs.directory.as_deref(), "docs"),
            base_dir: config_dir.to_path_buf(),
            index_page: self
                .docs
                .index_page
                .clone()
                .unwrap_or_else(|| "documentation".to_owned()),
        };

        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(defaults.enabled),
            namespace: self.cache.namespace.clone().unwrap_or(defaults.namespace),
            ttl: self
                .cache
                .ttl_seconds
                .map_or(defaults.ttl, Duration::from_secs),
            backend: self.cache.backend,
            dir: resolve(self.cache.dir.as_deref(), ".dw/cache"),
        };
    }
}
