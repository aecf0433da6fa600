//! Valet CLI entry point.
//!
//! Binary name: `valet`
//!
//! Parses CLI arguments, wires the engine and its collaborators, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,valet=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::Run { workflow, utterance } => {
            cli::run::run_workflow(&state, &workflow, utterance.as_deref(), cli.json).await?;
        }

        Commands::Validate { workflow } => {
            cli::run::validate_workflow(&workflow, cli.json).await?;
        }

        Commands::Ask { text } => {
            cli::ask::ask(&state, &text.join(" "), cli.json).await?;
        }

        Commands::History { limit } => {
            cli::history::show_history(&state, limit, cli.json).await?;
        }

        Commands::Tools => {
            cli::tools::list_tools(&state, cli.json)?;
        }
    }

    Ok(())
}
