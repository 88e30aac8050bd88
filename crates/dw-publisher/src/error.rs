//! Publisher error types.

use std::io;
use std::path::PathBuf;

/// Error constructing a [`DocumentationPublisher`](crate::DocumentationPublisher).
///
/// Per-product failures never surface here; they are reported through
/// [`OperationResult`](dw_product::OperationResult).
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    /// The documentation root cannot be created or written.
    #[error("Documentation root `{}` is not usable: {source}", path.display())]
    DocumentationRoot {
        /// Configured root.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The bulk update worker pool could not be started.
    #[error("Failed to create update thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
