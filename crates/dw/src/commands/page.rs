//! `dw show` and `dw exists` command implementations.

use std::sync::Arc;

use clap::Args;
use dw_provider::{CommonMarkParser, DocumentationProvider, INDEX_PAGE};
use serde_json::json;

use super::{GlobalArgs, build_cache, load_product};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Product name.
    product: String,

    /// Version name (tag or branch).
    version: String,

    /// Page path without extension.
    #[arg(default_value = INDEX_PAGE)]
    page: String,

    /// Render without GitHub Flavored Markdown extensions.
    #[arg(long)]
    no_gfm: bool,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns an error if the product, version or page does not exist.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let product = load_product(&config, &self.product)?;
        let version = self.version;

        let parser = CommonMarkParser::new().with_gfm(!self.no_gfm);
        let provider = DocumentationProvider::new(&config, build_cache(&config), Arc::new(parser))?;
        let html = provider.get_page(&product, &version, Some(&self.page))?;

        if html.is_empty() {
            return Err(CliError::PageNotFound {
                product: product.name().to_owned(),
                version,
                page: self.page,
            });
        }

        if global.json {
            let value = json!({
                "product": product.key(),
                "version": version,
                "page": self.page,
                "html": html,
            });
            output.print(&serde_json::to_string_pretty(&value)?);
        } else {
            output.print(&html);
        }
        Ok(())
    }
}

/// Arguments for the exists command.
#[derive(Args)]
pub(crate) struct ExistsArgs {
    /// Product name.
    product: String,

    /// Version name.
    version: String,

    /// Page path without extension.
    page: String,
}

impl ExistsArgs {
    /// Execute the exists command.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the page is missing.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let product = load_product(&config, &self.product)?;
        let provider = DocumentationProvider::new(
            &config,
            build_cache(&config),
            Arc::new(CommonMarkParser::new()),
        )?;

        let exists = provider.section_exists(&product, &self.version, &self.page);
        if global.json {
            output.print(&json!({ "exists": exists }).to_string());
        } else if exists {
            let path = provider.page_path(&product, &self.version, &self.page);
            output.success(&path.display().to_string());
        }

        if exists {
            Ok(())
        } else {
            Err(CliError::PageNotFound {
                product: product.name().to_owned(),
                version: self.version,
                page: self.page,
            })
        }
    }
}
