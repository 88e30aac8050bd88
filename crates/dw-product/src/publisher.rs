//! Product publication: keep the working copy current, materialize tags.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use dw_vcs::{VcsCommandRunner, VcsError};
use serde_json::Value;

use crate::error::{Asset, PublicationError};
use crate::product::{Product, is_reserved};
use crate::result::{OperationResult, extra_keys};
use crate::version::sort_versions;

/// Whether `working_directory` holds a VCS working copy.
#[must_use]
pub fn has_working_copy(working_directory: &Path) -> bool {
    working_directory.join(".git").exists()
}

/// Brings one product's versions in line with its upstream repository.
///
/// The primary branch is cloned once into the product's working copy and
/// pulled on every later run. Each tag is then exported into its own version
/// directory, unless that directory already exists.
pub struct ProductPublisher {
    vcs: Arc<dyn VcsCommandRunner>,
    default_branch: String,
}

impl ProductPublisher {
    /// Create a publisher cloning `default_branch` on first publication.
    pub fn new(vcs: Arc<dyn VcsCommandRunner>, default_branch: impl Into<String>) -> Self {
        Self {
            vcs,
            default_branch: default_branch.into(),
        }
    }

    /// Publish `product`, cloning from `source` if it has no working copy yet.
    ///
    /// Failures are reported in the returned result; nothing is rolled back.
    pub fn publish(&self, product: &Product, source: Option<&str>) -> OperationResult {
        let mut messages = Vec::new();
        let mut published = Vec::new();

        let outcome = self.synchronize(product, source, &mut messages, &mut published);
        let result = OperationResult::new()
            .with_messages(messages)
            .with_extra(
                extra_keys::VERSIONS_PUBLISHED,
                Value::from(published),
            );

        match outcome {
            Ok(()) => result,
            Err(err) => {
                tracing::error!(
                    product = %product.key(),
                    stage = err.asset().map(ToString::to_string),
                    error = %err,
                    "Publication failed"
                );
                result.with_error(err.to_string())
            }
        }
    }

    /// Update an already published product. Never clones.
    pub fn update(&self, product: &Product) -> OperationResult {
        self.publish(product, None)
    }

    fn synchronize(
        &self,
        product: &Product,
        source: Option<&str>,
        messages: &mut Vec<String>,
        published: &mut Vec<String>,
    ) -> Result<(), PublicationError> {
        let working = product.working_directory();
        let failed = |asset: Asset| {
            move |source: VcsError| PublicationError::AssetPublicationFailed {
                product: product.name().to_owned(),
                asset,
                source,
            }
        };

        if has_working_copy(&working) {
            self.vcs.pull(&working).map_err(failed(Asset::Pull))?;
            messages.push(format!("Pulled latest changes for {}.", product.key()));
        } else {
            let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
                return Err(PublicationError::MissingSource {
                    product: product.name().to_owned(),
                });
            };
            // Leftover of an interrupted clone.
            if working.exists() {
                tracing::warn!(path = %working.display(), "Removing incomplete working copy");
                fs::remove_dir_all(&working).map_err(|source| PublicationError::WorkingCopy {
                    path: working.clone(),
                    source,
                })?;
            }
            self.vcs
                .clone_repository(source, &self.default_branch, &working)
                .map_err(failed(Asset::Clone))?;
            messages.push(format!(
                "Cloned {source} ({}) for {}.",
                self.default_branch,
                product.key()
            ));
        }

        let mut tags = self.vcs.tags(&working).map_err(failed(Asset::Tags))?;
        sort_versions(&mut tags);
        let mut seen = HashSet::new();
        tags.retain(|t| seen.insert(t.clone()));

        for tag in tags {
            if is_reserved(&tag) {
                tracing::warn!(product = %product.key(), tag = %tag, "Skipping tag with reserved name");
                continue;
            }
            let target = product.version_directory(&tag);
            if target.exists() {
                continue;
            }
            self.vcs
                .export(&working, &tag, &target)
                .map_err(failed(Asset::Version(tag.clone())))?;
            tracing::info!(product = %product.key(), version = %tag, "Published version");
            messages.push(format!("Published version {tag} of {}.", product.key()));
            published.push(tag);
        }

        Ok(())
    }
}
