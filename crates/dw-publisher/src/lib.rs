//! Documentation publishing for DW.
//!
//! [`DocumentationPublisher`] is the entry point for publishing and refreshing
//! products under the documentation root. It serializes work per product,
//! verifies the product directory is writable before touching the VCS, and
//! relays progress to a [`Reporter`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use dw_config::Config;
//! use dw_publisher::{DocumentationPublisher, TracingReporter};
//! use dw_vcs::GitCommandRunner;
//!
//! let config = Config::load(None, None)?;
//! let publisher = DocumentationPublisher::new(
//!     &config,
//!     Arc::new(GitCommandRunner::new(&config.vcs.git_binary)),
//!     Arc::new(TracingReporter),
//! )?;
//! let result = publisher.publish("Test Product", "https://example.com/test-product.git");
//! assert!(result.is_success());
//! ```

mod error;
mod locks;
mod publisher;
mod reporter;

pub use error::PublisherError;
pub use publisher::DocumentationPublisher;
pub use reporter::{CollectingReporter, NullReporter, Reporter, TracingReporter};
