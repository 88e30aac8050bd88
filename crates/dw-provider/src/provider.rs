//! Documentation provider.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dw_cache::{Cache, CacheExt};
use dw_config::Config;
use dw_product::{Product, is_reserved, version_directory_name};

use crate::error::ProviderError;
use crate::markdown::MarkdownParser;

/// Page name requested when none is given.
pub const INDEX_PAGE: &str = "index";

const VERSION_PLACEHOLDER: &str = "{{version}}";
/// Placeholder as emitted inside `href` attributes by markdown renderers.
const ENCODED_VERSION_PLACEHOLDER: &str = "%7B%7Bversion%7D%7D";

/// Serves rendered documentation pages.
///
/// Pages are read from `{product}/{version}/{page}.md`, rendered and cached
/// for the configured TTL. A cached page is served as is until it expires;
/// edits on disk are not noticed before that.
pub struct DocumentationProvider {
    cache: Arc<dyn Cache>,
    parser: Arc<dyn MarkdownParser>,
    namespace: String,
    ttl: Duration,
    index_page: String,
    route_prefix: String,
}

impl DocumentationProvider {
    /// Create a provider over the configured documentation root.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::DocumentationRootMissing`] if the root does
    /// not exist.
    pub fn new(
        config: &Config,
        cache: Arc<dyn Cache>,
        parser: Arc<dyn MarkdownParser>,
    ) -> Result<Self, ProviderError> {
        let root = &config.docs_resolved.directory;
        if !root.is_dir() {
            return Err(ProviderError::DocumentationRootMissing(root.clone()));
        }
        Ok(Self {
            cache,
            parser,
            namespace: config.cache_resolved.namespace.clone(),
            ttl: config.cache_resolved.ttl,
            index_page: config.docs_resolved.index_page.clone(),
            route_prefix: config.route.prefix.trim_end_matches('/').to_owned(),
        })
    }

    /// Rendered HTML of `page` (default: the index page) of `version`.
    ///
    /// Returns an empty string when the page does not exist; that outcome is
    /// not cached.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidPath`] for versions or pages leaving
    /// the product directory, and [`ProviderError::Io`] if an existing page
    /// cannot be read.
    pub fn get_page(
        &self,
        product: &Product,
        version: &str,
        page: Option<&str>,
    ) -> Result<String, ProviderError> {
        let page = page.unwrap_or(INDEX_PAGE);
        let key = self.cache_key(product, version, page);

        if let Some(html) = self.cache.get_string(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(html);
        }

        let path = self.checked_page_path(product, version, page)?;
        let markdown = match fs::read_to_string(&path) {
            Ok(markdown) => markdown,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Page not found");
                return Ok(String::new());
            }
            Err(source) => return Err(ProviderError::Io { path, source }),
        };

        let html = self.replace_links(product, version, &self.parser.parse(&markdown));
        self.cache.put_string(&key, &html, self.ttl);
        tracing::debug!(key = %key, path = %path.display(), "Rendered page");
        Ok(html)
    }

    /// Substitute version placeholders in rendered content.
    ///
    /// `docs/{{version}}` becomes `{prefix}/{product}/{version}` first; any
    /// remaining `{{version}}` becomes the version name.
    pub fn replace_links(&self, product: &Product, version: &str, content: &str) -> String {
        let target = format!("{}/{}/{version}", self.route_prefix, product.key());
        content
            .replace(&format!("docs/{VERSION_PLACEHOLDER}"), &target)
            .replace(&format!("docs/{ENCODED_VERSION_PLACEHOLDER}"), &target)
            .replace(VERSION_PLACEHOLDER, version)
            .replace(ENCODED_VERSION_PLACEHOLDER, version)
    }

    /// Whether `page` exists for `version`. Never consults the cache.
    pub fn section_exists(&self, product: &Product, version: &str, page: &str) -> bool {
        self.checked_page_path(product, version, page)
            .is_ok_and(|path| path.is_file())
    }

    /// Source file of `page` for `version`.
    pub fn page_path(&self, product: &Product, version: &str, page: &str) -> PathBuf {
        let file = if page == INDEX_PAGE {
            self.index_page.as_str()
        } else {
            page
        };
        product
            .version_directory(version)
            .join(format!("{file}.md"))
    }

    /// Cache key of `page` for `version`.
    pub fn cache_key(&self, product: &Product, version: &str, page: &str) -> String {
        format!("{}.{}.{version}.{page}", self.namespace, product.key())
    }

    fn checked_page_path(
        &self,
        product: &Product,
        version: &str,
        page: &str,
    ) -> Result<PathBuf, ProviderError> {
        let version_ok =
            !is_reserved(version) && is_single_segment(&version_directory_name(version));
        let page_ok = !page.is_empty()
            && Path::new(page)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if version_ok && page_ok {
            Ok(self.page_path(product, version, page))
        } else {
            Err(ProviderError::InvalidPath {
                version: version.to_owned(),
                page: page.to_owned(),
            })
        }
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
