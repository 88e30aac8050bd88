//! `dw publish`, `dw update` and `dw update-all` command implementations.

use std::sync::Arc;

use clap::Args;
use dw_config::Config;
use dw_publisher::{DocumentationPublisher, NullReporter, Reporter};
use dw_vcs::GitCommandRunner;

use super::{GlobalArgs, finish};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Product name (its slug names the product directory).
    product: String,

    /// Repository URL or path to clone from.
    source: String,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or publication fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let publisher = create_publisher(&config, global.json)?;

        if !global.json {
            output.info(&format!("Publishing {} from {}...", self.product, self.source));
        }
        let result = publisher.publish(&self.product, &self.source);
        finish(&output, &result, global.json)
    }
}

/// Arguments for the update command.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Product name.
    product: String,
}

impl UpdateArgs {
    /// Execute the update command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the update fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(None)?;
        let publisher = create_publisher(&config, global.json)?;

        if !global.json {
            output.info(&format!("Updating {}...", self.product));
        }
        let result = publisher.update(&self.product);
        finish(&output, &result, global.json)
    }
}

/// Arguments for the update-all command.
#[derive(Args)]
pub(crate) struct UpdateAllArgs {
    /// Number of products updated in parallel (overrides config).
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

impl UpdateAllArgs {
    /// Execute the update-all command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the documentation
    /// root cannot be read.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(self.concurrency)?;
        let publisher = create_publisher(&config, global.json)?;

        let result = publisher.update_all();

        if !global.json {
            let updated = result.products_updated();
            for product in result.products() {
                if updated.contains(&product) {
                    output.detail(&format!("  updated  {product}"));
                } else {
                    output.warning(&format!("  failed   {product}"));
                }
            }
            for message in result.messages() {
                output.info(message);
            }
        }
        finish(&output, &result, global.json)
    }
}

/// Publisher over the git executable, reporting progress unless printing JSON.
fn create_publisher(config: &Config, json: bool) -> Result<DocumentationPublisher, CliError> {
    let reporter: Arc<dyn Reporter> = if json {
        Arc::new(NullReporter)
    } else {
        Arc::new(Output::new())
    };
    let vcs = Arc::new(GitCommandRunner::new(config.vcs.git_binary.as_str()));
    Ok(DocumentationPublisher::new(config, vcs, reporter)?)
}
