//! Mock VCS runner for testing.
//!
//! Provides [`MockVcs`] for exercising publish flows without git or network
//! access. Clones and exports create real directories so filesystem-level
//! behavior can be asserted.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{VcsCommandRunner, VcsError};

/// Kind of VCS operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsOperation {
    /// `clone_repository`
    Clone,
    /// `pull`
    Pull,
    /// `tags`
    Tags,
    /// `export`
    Export,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    /// `clone_repository(source, branch, dir)`
    Clone {
        source: String,
        branch: String,
        dir: PathBuf,
    },
    /// `pull(dir)`
    Pull { dir: PathBuf },
    /// `tags(dir)`
    Tags { dir: PathBuf },
    /// `export(dir, reference, target)`
    Export {
        dir: PathBuf,
        reference: String,
        target: PathBuf,
    },
}

impl VcsCall {
    fn operation(&self) -> VcsOperation {
        match self {
            Self::Clone { .. } => VcsOperation::Clone,
            Self::Pull { .. } => VcsOperation::Pull,
            Self::Tags { .. } => VcsOperation::Tags,
            Self::Export { .. } => VcsOperation::Export,
        }
    }
}

/// A scripted failure: `operation` fails for working directories under `scope`.
#[derive(Debug)]
struct Failure {
    operation: VcsOperation,
    scope: PathBuf,
    reference: Option<String>,
}

/// Recording [`VcsCommandRunner`].
///
/// # Example
///
/// ```ignore
/// use dw_vcs::{MockVcs, VcsOperation};
///
/// let vcs = MockVcs::new()
///     .with_tags(["v1.0", "v2.0"])
///     .with_file("documentation.md", "# Docs")
///     .with_failure(VcsOperation::Pull, "/docs/broken");
/// ```
#[derive(Debug, Default)]
pub struct MockVcs {
    calls: Mutex<Vec<VcsCall>>,
    tags: Mutex<Vec<String>>,
    files: Mutex<HashMap<PathBuf, String>>,
    failures: Mutex<Vec<Failure>>,
}

impl MockVcs {
    /// Create a mock with no tags, files or failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags reported by every `tags()` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_tags(tags);
        self
    }

    /// File written into every exported tree. `content` may contain
    /// `{reference}`, replaced by the exported reference.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Make `operation` fail for working directories at or below `scope`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, operation: VcsOperation, scope: impl Into<PathBuf>) -> Self {
        self.failures.lock().unwrap().push(Failure {
            operation,
            scope: scope.into(),
            reference: None,
        });
        self
    }

    /// Make `export` of `reference` fail for working directories below `scope`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_export_failure(self, scope: impl Into<PathBuf>, reference: &str) -> Self {
        self.failures.lock().unwrap().push(Failure {
            operation: VcsOperation::Export,
            scope: scope.into(),
            reference: Some(reference.to_owned()),
        });
        self
    }

    /// Replace the reported tags (simulates upstream gaining or losing tags).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.tags.lock().unwrap() = tags.into_iter().map(Into::into).collect();
    }

    /// All recorded calls, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls of `operation`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn count(&self, operation: VcsOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: VcsCall) -> Result<(), VcsError> {
        let (operation, dir, reference) = match &call {
            VcsCall::Clone { dir, .. } => (VcsOperation::Clone, dir.clone(), None),
            VcsCall::Pull { dir } => (VcsOperation::Pull, dir.clone(), None),
            VcsCall::Tags { dir } => (VcsOperation::Tags, dir.clone(), None),
            VcsCall::Export { dir, reference, .. } => {
                (VcsOperation::Export, dir.clone(), Some(reference.clone()))
            }
        };
        self.calls.lock().unwrap().push(call);

        let fails = self.failures.lock().unwrap().iter().any(|f| {
            f.operation == operation
                && dir.starts_with(&f.scope)
                && (f.reference.is_none() || f.reference == reference)
        });
        if fails {
            return Err(VcsError::ProcessFailed {
                command: format!("mock {operation:?} {}", dir.display()),
                status: Some(1),
                stderr: "scripted failure".to_owned(),
            });
        }
        Ok(())
    }
}

fn io_failure(command: &str, source: std::io::Error) -> VcsError {
    VcsError::Spawn {
        command: command.to_owned(),
        source,
    }
}

impl VcsCommandRunner for MockVcs {
    fn clone_repository(
        &self,
        source: &str,
        branch: &str,
        working_directory: &Path,
    ) -> Result<(), VcsError> {
        self.record(VcsCall::Clone {
            source: source.to_owned(),
            branch: branch.to_owned(),
            dir: working_directory.to_path_buf(),
        })?;
        fs::create_dir_all(working_directory.join(".git"))
            .map_err(|e| io_failure("mock clone", e))
    }

    fn pull(&self, working_directory: &Path) -> Result<(), VcsError> {
        self.record(VcsCall::Pull {
            dir: working_directory.to_path_buf(),
        })
    }

    fn tags(&self, working_directory: &Path) -> Result<Vec<String>, VcsError> {
        self.record(VcsCall::Tags {
            dir: working_directory.to_path_buf(),
        })?;
        Ok(self.tags.lock().unwrap().clone())
    }

    fn export(
        &self,
        working_directory: &Path,
        reference: &str,
        target_directory: &Path,
    ) -> Result<(), VcsError> {
        self.record(VcsCall::Export {
            dir: working_directory.to_path_buf(),
            reference: reference.to_owned(),
            target: target_directory.to_path_buf(),
        })?;
        fs::create_dir_all(target_directory).map_err(|e| io_failure("mock export", e))?;
        let files = self.files.lock().unwrap().clone();
        for (path, content) in files {
            let file = target_directory.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).map_err(|e| io_failure("mock export", e))?;
            }
            fs::write(&file, content.replace("{reference}", reference))
                .map_err(|e| io_failure("mock export", e))?;
        }
        Ok(())
    }
}
