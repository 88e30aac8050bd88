//! Provider error types.

use std::io;
use std::path::PathBuf;

/// Error returned by [`DocumentationProvider`](crate::DocumentationProvider).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The documentation root does not exist.
    #[error("Documentation root `{}` does not exist.", .0.display())]
    DocumentationRootMissing(PathBuf),

    /// Version or page escapes the product directory.
    #[error("Invalid page `{page}` for version `{version}`.")]
    InvalidPath {
        /// Requested version.
        version: String,
        /// Requested page.
        page: String,
    },

    /// An existing page could not be read.
    #[error("Failed to read `{}`: {source}", path.display())]
    Io {
        /// Page source file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
