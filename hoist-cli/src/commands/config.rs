//! `hoist config` — view and edit the local component configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use hoist_core::config;

use super::confirm;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration parameter (creating the config if needed).
    Set {
        /// Parameter name (case-insensitive), e.g. `type` or `maxmemory`.
        parameter: String,
        /// New value.
        value: String,
        /// Overwrite an already-set parameter without confirmation.
        #[arg(long, short = 'f')]
        force: bool,
        /// Use the given directory as the component context (default: cwd).
        #[arg(long, short = 'c')]
        context: Option<PathBuf>,
    },

    /// Print the current configuration as a table.
    View {
        /// Use the given directory as the component context (default: cwd).
        #[arg(long, short = 'c')]
        context: Option<PathBuf>,
    },

    /// Clear an optional configuration parameter.
    Unset {
        /// Parameter name (case-insensitive).
        parameter: String,
        /// Use the given directory as the component context (default: cwd).
        #[arg(long, short = 'c')]
        context: Option<PathBuf>,
    },
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set {
            parameter,
            value,
            force,
            context,
        } => set(&parameter, &value, force, context),
        ConfigCommand::View { context } => view(context),
        ConfigCommand::Unset { parameter, context } => unset(&parameter, context),
    }
}

fn resolve_context(context: Option<PathBuf>) -> Result<PathBuf> {
    match context {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("could not determine current directory"),
    }
}

fn set(parameter: &str, value: &str, force: bool, context: Option<PathBuf>) -> Result<()> {
    let context = resolve_context(context)?;
    let mut settings = config::load_or_init_at(&context)
        .with_context(|| format!("failed to initialize config in {}", context.display()))?;

    if config::is_set(&settings, parameter) && !force {
        let current = config::parameter_value(&settings, parameter).unwrap_or_default();
        let question =
            format!("'{parameter}' is already set to '{current}'. Overwrite with '{value}'?");
        if !confirm(&question)? {
            println!("aborted");
            return Ok(());
        }
    }

    config::set_parameter(&mut settings, parameter, value)?;
    config::save_at(&context, &settings)?;
    println!(
        "{} set '{}' to '{}'",
        "✓".green(),
        parameter.to_ascii_lowercase(),
        value
    );
    Ok(())
}

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "parameter")]
    name: String,
    #[tabled(rename = "value")]
    value: String,
}

fn view(context: Option<PathBuf>) -> Result<()> {
    let context = resolve_context(context)?;
    let settings = config::load_at(&context)
        .with_context(|| format!("failed to load component config from {}", context.display()))?;

    let rows: Vec<ParameterRow> = config::parameter_values(&settings)
        .into_iter()
        .map(|(name, value)| ParameterRow { name, value })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn unset(parameter: &str, context: Option<PathBuf>) -> Result<()> {
    let context = resolve_context(context)?;
    let mut settings = config::load_at(&context)
        .with_context(|| format!("failed to load component config from {}", context.display()))?;
    config::unset_parameter(&mut settings, parameter)?;
    config::save_at(&context, &settings)?;
    println!(
        "{} cleared '{}'",
        "✓".green(),
        parameter.to_ascii_lowercase()
    );
    Ok(())
}
