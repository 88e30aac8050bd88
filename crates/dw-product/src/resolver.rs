//! Product directory resolution.

use std::fs;
use std::path::Path;

use crate::error::ResolveError;
use crate::product::{Product, Version, display_name, is_reserved, slugify, version_name};
use crate::version::{compare_versions, latest_version, parse_version};

/// Builds [`Product`]s from product directories.
///
/// Every non-reserved immediate subdirectory is a version. The default
/// version is the one named after the default branch when present,
/// otherwise the newest version-like name, otherwise the first name.
#[derive(Debug, Clone)]
pub struct ProductResolver {
    default_branch: String,
}

impl ProductResolver {
    /// Create a resolver preferring `default_branch` as the default version.
    pub fn new(default_branch: impl Into<String>) -> Self {
        Self {
            default_branch: default_branch.into(),
        }
    }

    /// Resolve `directory`, deriving the display name from its basename.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidDirectory`] if the directory is missing
    /// or unreadable.
    pub fn resolve(&self, directory: &Path) -> Result<Product, ResolveError> {
        let basename = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.build(directory, display_name(&basename), slugify(&basename))
    }

    /// Resolve `directory` under a caller-supplied display name.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidDirectory`] if the directory is missing
    /// or unreadable.
    pub fn resolve_named(&self, directory: &Path, name: &str) -> Result<Product, ResolveError> {
        self.build(directory, name.to_owned(), slugify(name))
    }

    fn build(&self, directory: &Path, name: String, key: String) -> Result<Product, ResolveError> {
        let mut versions: Vec<Version> = version_names(directory)?
            .iter()
            .map(|n| Version::new(version_name(n), directory.join(n)))
            .collect();

        let default_name = versions
            .iter()
            .map(Version::name)
            .find(|n| *n == self.default_branch)
            .or_else(|| {
                latest_version(
                    versions
                        .iter()
                        .map(Version::name)
                        .filter(|n| parse_version(n).is_some()),
                )
            })
            .or_else(|| versions.first().map(Version::name))
            .map(str::to_owned);

        // Newest first; listing order breaks ties.
        versions.sort_by(|a, b| compare_versions(b.name(), a.name()));

        let default_version = default_name
            .and_then(|d| versions.iter().find(|v| v.name() == d).cloned());

        tracing::debug!(
            product = %key,
            versions = versions.len(),
            default = default_version.as_ref().map(Version::name),
            "Resolved product"
        );

        Ok(Product::new(
            key,
            name,
            directory.to_path_buf(),
            versions,
            default_version,
        ))
    }
}

/// Sorted directory names of the version subdirectories of `directory`.
fn version_names(directory: &Path) -> Result<Vec<String>, ResolveError> {
    let invalid = |source| ResolveError::InvalidDirectory {
        path: directory.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(directory).map_err(invalid)? {
        let entry = entry.map_err(invalid)?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 directory name");
            continue;
        };
        if is_reserved(&name) || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
