//! Product and version entities.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::Serialize;

/// Directory, inside a product directory, holding the primary working copy.
pub const WORKING_COPY_DIR: &str = ".repository";

/// Whether a directory entry name can never be a version.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name.is_empty() || name.starts_with('.')
}

/// Characters escaped in version directory names.
const VERSION_DIR_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'%').add(b'/').add(b'\\');

/// Directory name a version is materialized under.
///
/// Path separators and `%` are percent-encoded so that a tag such as
/// `release/1.0` maps onto the single directory `release%2F1.0`.
///
/// ```
/// use dw_product::version_directory_name;
///
/// assert_eq!(version_directory_name("v1.0"), "v1.0");
/// assert_eq!(version_directory_name("release/1.0"), "release%2F1.0");
/// ```
#[must_use]
pub fn version_directory_name(name: &str) -> String {
    utf8_percent_encode(name, VERSION_DIR_ENCODE_SET).to_string()
}

/// Version name of a version directory; inverse of [`version_directory_name`].
pub(crate) fn version_name(directory_name: &str) -> String {
    percent_decode_str(directory_name)
        .decode_utf8_lossy()
        .into_owned()
}

/// Derive a product slug from its name.
///
/// Case-folds the name and collapses every run of whitespace, dots or path
/// separators into a single `-`, so a slug never contains the `.` that
/// separates cache key segments. Leading and trailing dashes are trimmed.
/// Applying it to a slug returns the slug unchanged.
///
/// ```
/// use dw_product::slugify;
///
/// assert_eq!(slugify("Test Product"), "test-product");
/// assert_eq!(slugify("test-product"), "test-product");
/// assert_eq!(slugify("  Core_API  "), "core_api");
/// assert_eq!(slugify("Vue.js"), "vue-js");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || matches!(c, '/' | '\\' | '-' | '.') {
            pending_dash = true;
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c);
    }
    slug
}

/// Display name derived from a directory name (`core-api` -> `Core Api`).
pub(crate) fn display_name(directory_name: &str) -> String {
    directory_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One browsable documentation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    name: String,
    directory: PathBuf,
}

impl Version {
    /// Create a version rooted at `directory`.
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
        }
    }

    /// Tag or branch name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this version's source tree.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// A documented project and its known versions.
///
/// Built by [`ProductResolver`](crate::ProductResolver) from the product
/// directory on every operation; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    key: String,
    name: String,
    directory: PathBuf,
    versions: Vec<Version>,
    default_version: Option<Version>,
}

impl Product {
    pub(crate) fn new(
        key: String,
        name: String,
        directory: PathBuf,
        versions: Vec<Version>,
        default_version: Option<Version>,
    ) -> Self {
        Self {
            key,
            name,
            directory,
            versions,
            default_version,
        }
    }

    /// URL- and cache-safe identity.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product directory under the documentation root.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Known versions, newest first.
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// Version shown when none is requested.
    pub fn default_version(&self) -> Option<&Version> {
        self.default_version.as_ref()
    }

    /// Look up a version by name.
    pub fn version(&self, name: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// Location of the primary working copy.
    pub fn working_directory(&self) -> PathBuf {
        self.directory.join(WORKING_COPY_DIR)
    }

    /// Location a version named `name` is (or would be) materialized at.
    pub fn version_directory(&self, name: &str) -> PathBuf {
        self.directory.join(version_directory_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Test Product"), "test-product");
        assert_eq!(slugify("DocWeaver"), "docweaver");
        assert_eq!(slugify("My   Big\tLib"), "my-big-lib");
        assert_eq!(slugify("a/b\\c"), "a-b-c");
        assert_eq!(slugify("--Leading and trailing--"), "leading-and-trailing");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("Node.js Guide"), "node-js-guide");
        assert_eq!(slugify(".Hidden."), "hidden");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for name in ["Test Product", "core_api", "ÉCOLE Docs", "v2 Guide", "Vue.js"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_slugify_case_folds() {
        assert_eq!(slugify("ÉCOLE"), "école");
        assert_eq!(slugify("Test Product"), slugify("TEST PRODUCT"));
    }

    #[test]
    fn test_version_directory_name() {
        assert_eq!(version_directory_name("v2.0"), "v2.0");
        assert_eq!(version_directory_name("feature/a\\b"), "feature%2Fa%5Cb");
        assert_eq!(version_directory_name("100%"), "100%25");
        for name in ["release/1.0", "100%", "v1.0"] {
            assert_eq!(version_name(&version_directory_name(name)), name);
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("test-product"), "Test Product");
        assert_eq!(display_name("core_api"), "Core Api");
        assert_eq!(display_name("docs"), "Docs");
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved(WORKING_COPY_DIR));
        assert!(is_reserved(".git"));
        assert!(is_reserved(""));
        assert!(!is_reserved("v1.0"));
        assert!(!is_reserved("master"));
    }

    #[test]
    fn test_product_paths() {
        let product = Product::new(
            "guide".to_owned(),
            "Guide".to_owned(),
            PathBuf::from("/docs/guide"),
            vec![Version::new("v1.0", "/docs/guide/v1.0")],
            None,
        );
        assert_eq!(
            product.working_directory(),
            PathBuf::from("/docs/guide/.repository")
        );
        assert_eq!(
            product.version_directory("v2.0"),
            PathBuf::from("/docs/guide/v2.0")
        );
        assert_eq!(product.version("v1.0").map(Version::name), Some("v1.0"));
        assert!(product.version("v3.0").is_none());
    }
}
