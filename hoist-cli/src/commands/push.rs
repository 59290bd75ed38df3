//! `hoist push` — reconcile a component with the deployment target.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hoist_core::{config, IgnoreRuleSet, SourceType};
use hoist_push::{
    push, DirTarget, OrchestrationOutcome, PushFlags, PushOptions, PushReport, SyncOutcome,
};

/// Arguments for `hoist push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Deployment target root directory.
    #[arg(long, env = "HOIST_TARGET")]
    pub target: PathBuf,

    /// Use the given directory as the component context (default: cwd).
    #[arg(long, short = 'c')]
    pub context: Option<PathBuf>,

    /// Push only component settings, skipping the smart change detection.
    #[arg(long)]
    pub config: bool,

    /// Push only the latest source, skipping the smart change detection.
    #[arg(long)]
    pub source: bool,

    /// Glob expressions excluding files from sync; fully replaces any
    /// `.hoistignore` rules.
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Show what would be pushed without touching the target.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the remote build log for repository sources.
    #[arg(long)]
    pub show_log: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let context = match self.context.clone() {
            Some(dir) => dir,
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let settings = config::load_at(&context)
            .with_context(|| format!("failed to load component config from {}", context.display()))?;

        // Explicit --ignore fully replaces file-derived rules.
        let rules = if !self.ignore.is_empty() {
            IgnoreRuleSet::from_patterns(&self.ignore)?
        } else if settings.source.source_type == SourceType::Repository {
            IgnoreRuleSet::empty()
        } else {
            let source_root = config::resolve_source_path(&context, &settings)?;
            let ignore_root = if settings.source.source_type == SourceType::Binary {
                source_root.parent().map(PathBuf::from).unwrap_or(source_root)
            } else {
                source_root
            };
            IgnoreRuleSet::from_source_root(&ignore_root)?
        };

        let options = PushOptions {
            flags: PushFlags {
                force_config: self.config,
                force_source: self.source,
            },
            allow_list: vec![],
            dry_run: self.dry_run,
        };

        let target = DirTarget::new(&self.target);
        let name = settings.name.clone();
        let report = push(&target, &context, &settings, &rules, &options).map_err(|e| {
            let phase = e.phase();
            anyhow::anyhow!(e).context(format!(
                "push failed for component '{name}' in {phase} phase"
            ))
        })?;

        print_report(&report, self.dry_run, self.show_log);
        Ok(())
    }
}

fn print_report(report: &PushReport, dry_run: bool, show_log: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let component = report.component.to_string();

    match &report.orchestration {
        OrchestrationOutcome::Created => {
            println!("{prefix}{} created component '{component}'", "✓".green())
        }
        OrchestrationOutcome::Applied => println!(
            "{prefix}{} applied settings to component '{component}'",
            "✓".green()
        ),
        OrchestrationOutcome::WouldCreate => {
            println!("{prefix}~ would create component '{component}'")
        }
        OrchestrationOutcome::WouldApply => {
            println!("{prefix}~ would apply settings to component '{component}'")
        }
        OrchestrationOutcome::Skipped => {
            println!("{prefix}· settings unchanged for '{component}'")
        }
    }

    match &report.sync {
        SyncOutcome::Transferred { sent, deleted } => {
            println!(
                "{prefix}{} source synced ({} sent, {} pruned)",
                "✓".green(),
                sent.len(),
                deleted.len()
            );
            for path in sent {
                println!("  ✎  {}", path.display());
            }
            for path in deleted {
                println!("  ✗  {}", path.display());
            }
        }
        SyncOutcome::Built { log } => {
            println!("{prefix}{} remote build triggered", "✓".green());
            if show_log {
                print!("{log}");
            }
        }
        SyncOutcome::WouldTransfer { files, deleted } => {
            println!(
                "{prefix}~ would send {} file(s), prune {}",
                files.len(),
                deleted.len()
            );
            for path in files {
                println!("  ~  {}", path.display());
            }
        }
        SyncOutcome::WouldBuild => println!("{prefix}~ would trigger remote build"),
        SyncOutcome::Skipped => println!("{prefix}· source unchanged"),
    }

    if report.decision.nothing_to_do() {
        println!("{prefix}{} '{component}' — nothing to do", "✓".green());
    }
    for reason in &report.decision.reasons {
        println!("  {}", reason.bright_black());
    }
}
