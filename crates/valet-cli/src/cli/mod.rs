//! CLI command definitions and dispatch for the `valet` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod history;
pub mod run;
pub mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Your personal workflow assistant.
#[derive(Parser)]
#[command(name = "valet", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and execute a workflow from a JSON file (`-` for stdin).
    Run {
        /// Path to the workflow JSON document.
        workflow: PathBuf,

        /// The user utterance the workflow came from, used by the
        /// keyword fallback for unknown actions.
        #[arg(long)]
        utterance: Option<String>,
    },

    /// Validate a workflow JSON file without executing it.
    Validate {
        /// Path to the workflow JSON document.
        workflow: PathBuf,
    },

    /// Plan a workflow from a natural-language request and execute it.
    Ask {
        /// The request, e.g. `valet ask write a letter to my landlord`.
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Show recent conversation history.
    History {
        /// Number of entries to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List registered actions, builtin and synthesized.
    Tools,
}
