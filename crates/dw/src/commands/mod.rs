//! CLI command implementations.

pub(crate) mod page;
pub(crate) mod publish;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use dw_cache::{Cache, FileCache, MemoryCache, NullCache};
use dw_config::{CacheBackend, CliSettings, Config};
use dw_product::{OperationResult, Product, ProductResolver, slugify};

use crate::error::CliError;
use crate::output::Output;

pub(crate) use page::{ExistsArgs, ShowArgs};
pub(crate) use publish::{PublishArgs, UpdateAllArgs, UpdateArgs};

/// Cache format version; file caches written by other builds are discarded.
const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover dw.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Documentation root directory (overrides config).
    #[arg(long, global = true, env = "DW_DOCS_DIR")]
    docs_dir: Option<PathBuf>,

    /// Disable the page cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Load configuration with command-line overrides applied.
    pub(crate) fn load_config(&self, update_concurrency: Option<usize>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            docs_dir: self.docs_dir.clone(),
            cache_enabled: self.no_cache.then_some(false),
            update_concurrency,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Cache backend selected by configuration.
pub(crate) fn build_cache(config: &Config) -> Arc<dyn Cache> {
    let cache = &config.cache_resolved;
    if !cache.enabled {
        return Arc::new(NullCache);
    }
    match cache.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::File => Arc::new(FileCache::new(cache.dir.clone(), CACHE_VERSION)),
    }
}

/// Resolve a published product by name.
pub(crate) fn load_product(config: &Config, name: &str) -> Result<Product, CliError> {
    let directory = config.docs_resolved.directory.join(slugify(name));
    if !directory.is_dir() {
        return Err(CliError::ProductNotFound(name.to_owned()));
    }
    Ok(ProductResolver::new(config.vcs.default_branch.as_str()).resolve_named(&directory, name)?)
}

/// Print an operation result and turn a failed one into an error.
pub(crate) fn finish(
    output: &Output,
    result: &OperationResult,
    json: bool,
) -> Result<(), CliError> {
    if json {
        output.print(&serde_json::to_string_pretty(result)?);
    } else if result.is_success() {
        let elapsed = result.execution_time().unwrap_or_default();
        output.success(&format!("Done in {elapsed:.2}s."));
    }

    match result.error() {
        Some(error) => Err(CliError::Operation(error.to_owned())),
        None => Ok(()),
    }
}
