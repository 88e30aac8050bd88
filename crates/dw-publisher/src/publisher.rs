//! Documentation publisher.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::Instant;

use dw_config::Config;
use dw_product::{
    OperationResult, ProductPublisher, ProductResolver, extra_keys, is_reserved, slugify,
};
use dw_vcs::VcsCommandRunner;
use rayon::prelude::*;
use serde_json::Value;

use crate::error::PublisherError;
use crate::locks::SlugLocks;
use crate::reporter::Reporter;

/// Publishes and refreshes products under the documentation root.
///
/// Each product lives in `{root}/{slug}`. At most one operation runs per
/// product at a time; operations on different products may run concurrently.
pub struct DocumentationPublisher {
    root: PathBuf,
    resolver: ProductResolver,
    products: ProductPublisher,
    reporter: Arc<dyn Reporter>,
    locks: SlugLocks,
    pool: Option<rayon::ThreadPool>,
}

impl DocumentationPublisher {
    /// Create a publisher for the configured documentation root.
    ///
    /// The root is created when missing.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::DocumentationRoot`] if the root cannot be
    /// created or is not writable, and [`PublisherError::ThreadPool`] if the
    /// bulk update pool cannot be started.
    pub fn new(
        config: &Config,
        vcs: Arc<dyn VcsCommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, PublisherError> {
        let configured = &config.docs_resolved.directory;
        let root_error = |source| PublisherError::DocumentationRoot {
            path: configured.clone(),
            source,
        };
        // VCS commands run inside working copies, so targets must be absolute.
        let root = std::path::absolute(configured).map_err(root_error)?;
        ensure_writable(&root).map_err(root_error)?;

        let concurrency = config.publisher.update_concurrency;
        let pool = if concurrency > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(concurrency)
                    .thread_name(|i| format!("dw-update-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        let default_branch = config.vcs.default_branch.clone();
        Ok(Self {
            root,
            resolver: ProductResolver::new(default_branch.clone()),
            products: ProductPublisher::new(vcs, default_branch),
            reporter,
            locks: SlugLocks::default(),
            pool,
        })
    }

    /// Documentation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Publish `product_name`, cloning it from `source` on first publication.
    pub fn publish(&self, product_name: &str, source: &str) -> OperationResult {
        self.publish_named(product_name, Some(source))
    }

    /// Refresh an already published product.
    pub fn update(&self, product_name: &str) -> OperationResult {
        self.publish_named(product_name, None)
    }

    /// Refresh every product under the root.
    ///
    /// Individual failures do not stop the batch; the aggregate result lists
    /// every attempted product and the ones that succeeded.
    pub fn update_all(&self) -> OperationResult {
        let start = Instant::now();

        let products = match self.product_directories() {
            Ok(products) => products,
            Err(err) => {
                tracing::error!(root = %self.root.display(), error = %err, "Cannot list products");
                return OperationResult::failure(format!(
                    "Documentation root {} is not readable.",
                    self.root.display()
                ))
                .with_extra(extra_keys::EXECUTION_TIME, start.elapsed().as_secs_f64());
            }
        };

        let update_one = |(name, directory): &(String, PathBuf)| {
            self.reporter.report(&format!("Updating {name}..."));
            let result = self.run(name, directory, None, None);
            if let Some(error) = result.error() {
                tracing::warn!(product = %name, error = %error, "Product update failed");
            }
            result.is_success()
        };

        let outcomes: Vec<bool> = match &self.pool {
            Some(pool) => pool.install(|| products.par_iter().map(update_one).collect()),
            None => products.iter().map(update_one).collect(),
        };

        let names: Vec<Value> = products
            .iter()
            .map(|(name, _)| Value::from(name.as_str()))
            .collect();
        let updated: Vec<Value> = names
            .iter()
            .zip(&outcomes)
            .filter(|(_, ok)| **ok)
            .map(|(name, _)| name.clone())
            .collect();

        tracing::info!(
            products = names.len(),
            updated = updated.len(),
            "Bulk update finished"
        );

        OperationResult::new()
            .with_message(format!(
                "Updated {} of {} products.",
                updated.len(),
                names.len()
            ))
            .with_extra(extra_keys::PRODUCTS, names)
            .with_extra(extra_keys::PRODUCTS_UPDATED, updated)
            .with_extra(extra_keys::EXECUTION_TIME, start.elapsed().as_secs_f64())
    }

    fn publish_named(&self, product_name: &str, source: Option<&str>) -> OperationResult {
        let slug = slugify(product_name);
        if is_reserved(&slug) {
            return OperationResult::failure(format!("Invalid product name `{product_name}`."))
                .with_extra(extra_keys::EXECUTION_TIME, 0.0);
        }
        let directory = self.root.join(&slug);
        self.run(&slug, &directory, Some(product_name), source)
    }

    /// Timed, locked operation on one product directory.
    fn run(
        &self,
        slug: &str,
        directory: &Path,
        name: Option<&str>,
        source: Option<&str>,
    ) -> OperationResult {
        let start = Instant::now();
        let lock = self.locks.get(slug);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result = self.run_locked(directory, name, source);
        for message in result.messages() {
            self.reporter.report(message);
        }
        result.with_extra(extra_keys::EXECUTION_TIME, start.elapsed().as_secs_f64())
    }

    fn run_locked(
        &self,
        directory: &Path,
        name: Option<&str>,
        source: Option<&str>,
    ) -> OperationResult {
        let created = !directory.exists();
        if let Err(err) = ensure_writable(directory) {
            tracing::error!(path = %directory.display(), error = %err, "Product directory is not writable");
            return OperationResult::failure(format!(
                "Product directory {} is not writable.",
                directory.display()
            ));
        }

        let resolved = match name {
            Some(name) => self.resolver.resolve_named(directory, name),
            None => self.resolver.resolve(directory),
        };
        let result = match resolved {
            Ok(product) => self.products.publish(&product, source),
            Err(err) => OperationResult::failure(err.to_string()),
        };

        // A failed first run must not leave an empty product behind for
        // `update_all` to trip over.
        if created && !result.is_success() && fs::remove_dir(directory).is_ok() {
            tracing::debug!(path = %directory.display(), "Removed empty product directory");
        }
        result
    }

    /// Product directories under the root, sorted by name.
    fn product_directories(&self) -> io::Result<Vec<(String, PathBuf)>> {
        let mut products = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_reserved(&name) && path.is_dir() {
                products.push((name, path));
            }
        }
        products.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(products)
    }
}

/// Create `directory` if needed and check a file can be written in it.
fn ensure_writable(directory: &Path) -> io::Result<()> {
    fs::create_dir_all(directory)?;
    tempfile::Builder::new()
        .prefix(".dw-probe")
        .tempfile_in(directory)
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::CollectingReporter;
    use dw_vcs::{MockVcs, VcsOperation};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SOURCE: &str = "https://example.com/test-product.git";

    struct Fixture {
        tmp: TempDir,
        vcs: Arc<MockVcs>,
        reporter: Arc<CollectingReporter>,
        publisher: DocumentationPublisher,
    }

    impl Fixture {
        fn root(&self) -> PathBuf {
            self.tmp.path().join("docs")
        }
    }

    fn config(tmp: &TempDir, concurrency: usize) -> Config {
        let mut config = Config::default_with_base(tmp.path());
        config.publisher.update_concurrency = concurrency;
        config
    }

    fn fixture_with(tmp: TempDir, vcs: MockVcs, concurrency: usize) -> Fixture {
        let vcs = Arc::new(vcs);
        let reporter = Arc::new(CollectingReporter::new());
        let publisher = DocumentationPublisher::new(
            &config(&tmp, concurrency),
            Arc::clone(&vcs) as Arc<dyn VcsCommandRunner>,
            Arc::clone(&reporter) as Arc<dyn Reporter>,
        )
        .unwrap();
        Fixture {
            tmp,
            vcs,
            reporter,
            publisher,
        }
    }

    fn fixture(vcs: MockVcs) -> Fixture {
        fixture_with(TempDir::new().unwrap(), vcs, 1)
    }

    fn subdirs(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|n| !is_reserved(n))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_creates_missing_root() {
        let f = fixture(MockVcs::new());
        assert!(f.root().is_dir());
        assert_eq!(f.publisher.root(), f.root());
    }

    #[test]
    fn test_new_fails_when_root_cannot_exist() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("docs"), "a file, not a directory").unwrap();

        let err = DocumentationPublisher::new(
            &config(&tmp, 1),
            Arc::new(MockVcs::new()),
            Arc::new(CollectingReporter::new()),
        )
        .err()
        .unwrap();

        assert!(matches!(err, PublisherError::DocumentationRoot { .. }));
    }

    #[test]
    fn test_publish_new_product() {
        let f = fixture(MockVcs::new().with_tags(["v1.0", "v2.0"]));

        let result = f.publisher.publish("Test Product", SOURCE);

        assert!(result.is_success(), "{:?}", result.error());
        assert_eq!(f.vcs.count(VcsOperation::Clone), 1);
        let product_dir = f.root().join("test-product");
        assert!(product_dir.join(".repository").is_dir());
        assert_eq!(subdirs(&product_dir), vec!["v1.0", "v2.0"]);
        assert!(result.execution_time().is_some_and(|t| t >= 0.0));
        assert_eq!(f.reporter.messages(), result.messages());
        assert!(
            f.reporter
                .messages()
                .contains(&"Published version v1.0 of test-product.".to_owned())
        );
    }

    #[test]
    fn test_republish_pulls_instead_of_cloning() {
        let f = fixture(MockVcs::new().with_tags(["v1.0"]));
        assert!(f.publisher.publish("Test Product", SOURCE).is_success());
        f.vcs.reset_calls();

        let result = f.publisher.publish("Test Product", SOURCE);

        assert!(result.is_success());
        assert_eq!(f.vcs.count(VcsOperation::Clone), 0);
        assert_eq!(f.vcs.count(VcsOperation::Pull), 1);
    }

    #[test]
    fn test_update_picks_up_new_tags() {
        let f = fixture(MockVcs::new().with_tags(["v1.0"]));
        f.publisher.publish("Test Product", SOURCE);
        f.vcs.set_tags(["v1.0", "v1.1"]);

        let result = f.publisher.update("test-product");

        assert!(result.is_success());
        assert_eq!(
            subdirs(&f.root().join("test-product")),
            vec!["v1.0", "v1.1"]
        );
    }

    #[test]
    fn test_unwritable_product_directory() {
        let f = fixture(MockVcs::new());
        let product_dir = f.root().join("test-product");
        fs::write(&product_dir, "blocks the product directory").unwrap();

        let result = f.publisher.publish("Test Product", SOURCE);

        assert!(!result.is_success());
        assert_eq!(
            result.error(),
            Some(format!("Product directory {} is not writable.", product_dir.display()).as_str())
        );
        assert!(result.execution_time().is_some());
        assert!(f.vcs.calls().is_empty());
    }

    #[test]
    fn test_update_unknown_product_fails() {
        let f = fixture(MockVcs::new());

        let result = f.publisher.update("never-published");

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Nothing to publish"));
        assert!(result.execution_time().is_some());
        assert!(!f.root().join("never-published").exists());
        assert!(f.publisher.update_all().products().is_empty());
    }

    #[test]
    fn test_failed_first_clone_leaves_no_product() {
        let tmp = TempDir::new().unwrap();
        let working = tmp.path().join("docs/test-product/.repository");
        let f = fixture_with(
            tmp,
            MockVcs::new().with_failure(VcsOperation::Clone, working),
            1,
        );

        let result = f.publisher.publish("Test Product", SOURCE);

        assert!(!result.is_success());
        assert!(!f.root().join("test-product").exists());
    }

    #[test]
    fn test_failed_update_keeps_existing_product() {
        let f = fixture(MockVcs::new().with_tags(["v1.0"]));
        assert!(f.publisher.publish("Test Product", SOURCE).is_success());
        let product_dir = f.root().join("test-product");
        fs::remove_dir_all(product_dir.join(".repository")).unwrap();

        let result = f.publisher.update("Test Product");

        assert!(!result.is_success());
        assert_eq!(subdirs(&product_dir), vec!["v1.0"]);
    }

    #[test]
    fn test_invalid_product_name() {
        let f = fixture(MockVcs::new());

        let result = f.publisher.publish("   ", SOURCE);

        assert!(!result.is_success());
        assert!(f.vcs.calls().is_empty());
    }

    fn update_all_fixture(concurrency: usize) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("docs").join("b");
        let f = fixture_with(
            tmp,
            MockVcs::new()
                .with_tags(["v1.0"])
                .with_failure(VcsOperation::Pull, broken),
            concurrency,
        );
        for name in ["c", "a", "b"] {
            assert!(f.publisher.publish(name, SOURCE).is_success());
        }
        fs::create_dir_all(f.root().join(".cache")).unwrap();
        f
    }

    #[test]
    fn test_update_all_continues_past_failures() {
        let f = update_all_fixture(1);

        let result = f.publisher.update_all();

        assert!(result.is_success());
        assert_eq!(result.products(), vec!["a", "b", "c"]);
        assert_eq!(result.products_updated(), vec!["a", "c"]);
        assert!(result.execution_time().is_some());
        let messages = f.reporter.messages();
        for name in ["a", "b", "c"] {
            assert!(messages.contains(&format!("Updating {name}...")));
        }
    }

    #[test]
    fn test_update_all_concurrent_is_deterministic() {
        let f = update_all_fixture(4);

        let result = f.publisher.update_all();

        assert!(result.is_success());
        assert_eq!(result.products(), vec!["a", "b", "c"]);
        assert_eq!(result.products_updated(), vec!["a", "c"]);
    }

    #[test]
    fn test_update_all_on_empty_root() {
        let f = fixture(MockVcs::new());

        let result = f.publisher.update_all();

        assert!(result.is_success());
        assert!(result.products().is_empty());
        assert!(result.products_updated().is_empty());
    }

    #[test]
    fn test_concurrent_publish_clones_once() {
        let f = fixture(MockVcs::new().with_tags(["v1.0"]));

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    assert!(f.publisher.publish("Test Product", SOURCE).is_success());
                });
            }
        });

        assert_eq!(f.vcs.count(VcsOperation::Clone), 1);
        assert_eq!(f.vcs.count(VcsOperation::Pull), 3);
        assert_eq!(f.vcs.count(VcsOperation::Export), 1);
    }
}
