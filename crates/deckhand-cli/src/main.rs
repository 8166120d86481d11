//! Deckhand CLI: the `deckhand` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use config::ConvertArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Convert {
            files,
            distro,
            output_dir,
            strict_validation,
            reject_collisions,
        } => commands::convert::run(
            config,
            ConvertArgs {
                files,
                distro,
                output_dir,
                strict_validation,
                reject_collisions,
            },
        ),

        Commands::Validate { files, json } => commands::validate::run(config, files, json),
    }
}

/// Logs go to stderr so stdout stays a clean document stream.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}
