//! Version control adapter for the DW documentation library.
//!
//! This crate is a pure process boundary: it knows how to materialize and
//! refresh working copies, but nothing about products or versions.
//!
//! - [`VcsCommandRunner`] trait with `clone_repository()`, `pull()`, `tags()`
//!   and `export()`
//! - [`GitCommandRunner`] implementation driving the `git` executable
//! - [`MockVcs`] recording runner for tests (behind `mock` feature flag)
//!
//! Operations are blocking and not transactional: a failed clone may leave a
//! partial directory behind. Callers serialize operations per working copy.

mod error;
mod git;
#[cfg(feature = "mock")]
mod mock;

use std::path::Path;

pub use error::VcsError;
pub use git::GitCommandRunner;
#[cfg(feature = "mock")]
pub use mock::{MockVcs, VcsCall, VcsOperation};

/// Remote repository operations.
pub trait VcsCommandRunner: Send + Sync {
    /// Create a fresh working copy of `source` checked out at `branch`.
    ///
    /// # Errors
    ///
    /// Fails if the remote is unreachable, the branch does not exist, or the
    /// target path is not writable.
    fn clone_repository(
        &self,
        source: &str,
        branch: &str,
        working_directory: &Path,
    ) -> Result<(), VcsError>;

    /// Fast-forward an existing working copy to upstream and fetch its tags.
    ///
    /// # Errors
    ///
    /// Fails on network failure, a non fast-forward upstream, or a directory
    /// that is not a working copy.
    fn pull(&self, working_directory: &Path) -> Result<(), VcsError>;

    /// List tag names known to the working copy, in the order the VCS reports them.
    ///
    /// # Errors
    ///
    /// Fails if the directory is not a working copy.
    fn tags(&self, working_directory: &Path) -> Result<Vec<String>, VcsError>;

    /// Materialize `reference` from the working copy into `target_directory`.
    ///
    /// Local only; the remote is not contacted.
    ///
    /// # Errors
    ///
    /// Fails if the reference is unknown or the target cannot be created.
    fn export(
        &self,
        working_directory: &Path,
        reference: &str,
        target_directory: &Path,
    ) -> Result<(), VcsError>;
}
