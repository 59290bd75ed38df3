//! `hoist delete` — remove a deployed component from the target.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use hoist_core::{config, ComponentName};
use hoist_push::{DirTarget, RemoteTarget};

use super::confirm;

/// Arguments for `hoist delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Component to delete (default: the one configured in the context).
    pub component: Option<String>,

    /// Deployment target root directory.
    #[arg(long, env = "HOIST_TARGET")]
    pub target: PathBuf,

    /// Use the given directory as the component context (default: cwd).
    #[arg(long, short = 'c')]
    pub context: Option<PathBuf>,

    /// Delete without confirmation.
    #[arg(long, short = 'f')]
    pub force: bool,
}

impl DeleteArgs {
    pub fn run(self) -> Result<()> {
        let context = match self.context.clone() {
            Some(dir) => dir,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let mut settings = config::load_at(&context)
            .with_context(|| format!("failed to load component config from {}", context.display()))?;
        if let Some(name) = &self.component {
            settings.name = ComponentName::from(name.as_str());
        }
        let descriptor = settings.descriptor();

        let target = DirTarget::new(&self.target);
        let exists = target
            .component_exists(&descriptor)
            .with_context(|| format!("failed to probe target for '{descriptor}'"))?;
        if !exists {
            bail!("component '{descriptor}' does not exist on the target");
        }

        if !self.force && !confirm(&format!("Really delete component '{descriptor}'?"))? {
            println!("aborted");
            return Ok(());
        }

        target
            .delete_component(&descriptor)
            .with_context(|| format!("failed to delete component '{descriptor}'"))?;
        println!("{} deleted component '{descriptor}'", "✓".green());
        Ok(())
    }
}
