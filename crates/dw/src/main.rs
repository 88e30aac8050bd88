//! DW CLI - Versioned documentation library.
//!
//! Provides commands for:
//! - `publish`: Clone a product and publish its tagged versions
//! - `update`: Pull a product and publish new tags
//! - `update-all`: Update every product under the documentation root
//! - `show`: Render a documentation page
//! - `exists`: Check whether a documentation page exists

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExistsArgs, GlobalArgs, PublishArgs, ShowArgs, UpdateAllArgs, UpdateArgs};
use output::Output;

/// DW - Versioned documentation library.
#[derive(Parser)]
#[command(name = "dw", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a product from its repository.
    Publish(PublishArgs),
    /// Update a published product.
    Update(UpdateArgs),
    /// Update every published product.
    UpdateAll(UpdateAllArgs),
    /// Render a documentation page.
    Show(ShowArgs),
    /// Check whether a documentation page exists.
    Exists(ExistsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(&cli.global),
        Commands::Update(args) => args.execute(&cli.global),
        Commands::UpdateAll(args) => args.execute(&cli.global),
        Commands::Show(args) => args.execute(&cli.global),
        Commands::Exists(args) => args.execute(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
