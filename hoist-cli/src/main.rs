//! Hoist — push local components to a deployment target.
//!
//! # Usage
//!
//! ```text
//! hoist push [--config] [--source] [--context <dir>] [--ignore <glob,...>] [--dry-run]
//! hoist delete [component] [--force]
//! hoist config set <parameter> <value> [--force]
//! hoist config view
//! hoist config unset <parameter>
//! ```
//!
//! Every command takes `--target <dir>` (or `$HOIST_TARGET`) naming the
//! deployment target root, and `--context <dir>` naming the component
//! directory (default: the current directory).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, delete::DeleteArgs, push::PushArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hoist",
    version,
    about = "Reconcile a local component with a deployment target",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push component settings and source to the deployment target.
    Push(PushArgs),

    /// Delete a deployed component.
    Delete(DeleteArgs),

    /// Inspect or edit the local component configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Push(args) => args.run(),
        Commands::Delete(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
