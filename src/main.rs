use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ptl_editor::cli::{Cli, Commands};
use ptl_editor::{config, editor, text};

fn main() -> Result<()> {
    let verbose = config::Config::load()
        .map(|c| c.general.verbose)
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "ptl_editor=debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diff { old, new, html } => text::run_diff(&old, &new, html)?,
        Commands::Mask { text } => text::run_mask(&text)?,
        Commands::Config(args) => config::commands::run(args)?,
        command => {
            // One cooperative event loop, as in the browser
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start the async runtime")?;
            runtime.block_on(editor::commands::run(command, cli.hash, cli.server))?;
        }
    }

    Ok(())
}
