//! Products, versions and VCS-backed version publishing for DW.
//!
//! A product lives in one directory under the documentation root:
//!
//! ```text
//! {root}/{product}/.repository/   primary working copy (reserved)
//! {root}/{product}/{tag}/         one materialized tree per tag
//! ```
//!
//! - [`ProductResolver`] turns such a directory into a [`Product`]
//! - [`ProductPublisher`] brings the working copy up to date and materializes
//!   missing tags
//! - [`OperationResult`] is the uniform outcome of publish operations
//!
//! Version names are ordered semantically where they parse as versions (see
//! [`compare_versions`]).

mod error;
mod product;
mod publisher;
mod resolver;
mod result;
mod version;

pub use error::{Asset, PublicationError, ResolveError};
pub use product::{
    Product, Version, WORKING_COPY_DIR, is_reserved, slugify, version_directory_name,
};
pub use publisher::{ProductPublisher, has_working_copy};
pub use resolver::ProductResolver;
pub use result::{OperationResult, extra_keys};
pub use version::{compare_versions, latest_version, parse_version, sort_versions};
