//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::book::DEFAULT_BOOK_FILE;

#[derive(Parser)]
#[command(name = "assistbot")]
#[command(author, version, about = "Provision an isolated environment and launch the assistant", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Bootstrap config file (default: ./Bootstrap.toml if present)
    #[arg(long, global = true, env = "ASSISTBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Select the runtime, copy the workspace, create the environment, install dependencies
    Build {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },

    /// Launch the entry program in a provisioned environment
    Run {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },

    /// Build, then run
    Up {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },

    /// Start the contact assistant
    Chat {
        /// Address book file
        #[arg(long, default_value = DEFAULT_BOOK_FILE)]
        book: PathBuf,
    },

    /// Parse and print a dependency manifest
    Manifest {
        /// Path to the requirements file
        path: PathBuf,
    },
}

#[derive(clap::Args, Default)]
pub struct WorkspaceArgs {
    /// Override the workspace source directory
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Override the workspace destination directory
    #[arg(long)]
    pub destination: Option<PathBuf>,
}
