//! Product error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use dw_vcs::VcsError;

/// Error returned when a product directory cannot be read.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Directory does not exist or is unreadable.
    #[error("Invalid product directory: `{}`.", path.display())]
    InvalidDirectory {
        /// Offending directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Publication stage that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// Initial clone of the primary branch.
    Clone,
    /// Fast-forward of an existing working copy.
    Pull,
    /// Tag listing.
    Tags,
    /// Materialization of one tag.
    Version(String),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clone => f.write_str("repository"),
            Self::Pull => f.write_str("upstream"),
            Self::Tags => f.write_str("tag"),
            Self::Version(tag) => write!(f, "version `{tag}`"),
        }
    }
}

/// Error returned when a product cannot be brought up to date.
#[derive(Debug, thiserror::Error)]
pub enum PublicationError {
    /// No working copy exists and no source was supplied.
    #[error("Nothing to publish for product `{product}`: no working copy and no source given.")]
    MissingSource {
        /// Product display name.
        product: String,
    },
    /// A VCS operation failed.
    #[error("Failed to publish {asset} assets for product `{product}`: {source}")]
    AssetPublicationFailed {
        /// Product display name.
        product: String,
        /// Stage that failed.
        asset: Asset,
        /// Underlying VCS failure.
        #[source]
        source: VcsError,
    },
    /// The working copy location could not be prepared.
    #[error("Could not prepare working copy `{}`: {source}", path.display())]
    WorkingCopy {
        /// Working copy directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PublicationError {
    /// The failed stage, for VCS failures.
    #[must_use]
    pub fn asset(&self) -> Option<&Asset> {
        match self {
            Self::AssetPublicationFailed { asset, .. } => Some(asset),
            Self::MissingSource { .. } | Self::WorkingCopy { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_publication_message() {
        let err = PublicationError::AssetPublicationFailed {
            product: "Test Product".to_owned(),
            asset: Asset::Version("v2.0".to_owned()),
            source: VcsError::ProcessFailed {
                command: "git worktree add".to_owned(),
                status: Some(128),
                stderr: "invalid reference: v2.0".to_owned(),
            },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to publish version `v2.0` assets for product `Test Product`"));
        assert!(msg.contains("invalid reference"));
        assert_eq!(err.asset(), Some(&Asset::Version("v2.0".to_owned())));
    }

    #[test]
    fn test_invalid_directory_message() {
        let err = ResolveError::InvalidDirectory {
            path: PathBuf::from("/docs/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Invalid product directory: `/docs/missing`.");
    }
}
