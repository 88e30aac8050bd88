//! CLI error types.

use dw_config::ConfigError;
use dw_product::ResolveError;
use dw_provider::ProviderError;
use dw_publisher::PublisherError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Publisher(#[from] PublisherError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Product `{0}` has not been published")]
    ProductNotFound(String),

    #[error("Page `{page}` not found in {product} {version}")]
    PageNotFound {
        product: String,
        version: String,
        page: String,
    },

    #[error("{0}")]
    Operation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_not_found_message() {
        let err = CliError::PageNotFound {
            product: "Test Product".to_owned(),
            version: "v1.0".to_owned(),
            page: "install".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Page `install` not found in Test Product v1.0"
        );
    }

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let err = CliError::from(ResolveError::InvalidDirectory {
            path: "/docs/missing".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(err.to_string().contains("/docs/missing"));
    }
}
