//! Push pipeline — the canonical entrypoint tying probe, decision,
//! orchestration, and source sync together for one component.
//!
//! The sequence is strictly probe → decide → orchestrate → sync; each step's
//! output is the next step's input, so there is no internal parallelism.

use std::path::{Path, PathBuf};

use hoist_core::{
    config, fingerprint, ComponentDescriptor, ComponentSettings, ConfigFingerprint, IgnoreRuleSet,
    SourceType,
};

use crate::decision::{decide, PushFlags, SyncDecision};
use crate::error::PushError;
use crate::orchestrate::{execute, plan_action, DeploymentAction, OrchestrationOutcome};
use crate::probe::probe;
use crate::remote::RemoteTarget;
use crate::sync::{local_source_marker, sync_source, SyncOutcome};

/// Caller options for one push.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub flags: PushFlags,
    /// Explicit file set for an incremental local sync; empty = full sync.
    pub allow_list: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Everything a caller needs to report on a completed push.
#[derive(Debug)]
pub struct PushReport {
    pub component: ComponentDescriptor,
    pub fingerprint: ConfigFingerprint,
    pub decision: SyncDecision,
    pub action: DeploymentAction,
    pub orchestration: OrchestrationOutcome,
    pub sync: SyncOutcome,
}

/// Push one component: reconcile remote settings and source with local state.
///
/// Idempotent — a second run with no local changes decides
/// `config_apply = false, source_sync = false` and performs no writes.
pub fn push(
    target: &dyn RemoteTarget,
    context: &Path,
    settings: &ComponentSettings,
    rules: &IgnoreRuleSet,
    options: &PushOptions,
) -> Result<PushReport, PushError> {
    let descriptor = settings.descriptor();
    let local_fp = fingerprint(settings)?;

    // Repository sources have no local tree to resolve.
    let resolved = if settings.source.source_type == SourceType::Repository {
        PathBuf::new()
    } else {
        config::resolve_source_path(context, settings)?
    };

    let snapshot = probe(target, &descriptor)?;

    if options.flags.force_source && !options.flags.force_config && !snapshot.exists {
        return Err(PushError::SourceOnlyOnMissingComponent {
            component: descriptor.name.0.clone(),
        });
    }

    let local_marker = local_source_marker(settings, &resolved, rules)?;
    let decision = decide(&local_fp, &local_marker, &snapshot, &options.flags);
    for reason in &decision.reasons {
        tracing::debug!("{descriptor}: {reason}");
    }

    let action = plan_action(&snapshot, &decision);
    let orchestration = execute(target, settings, &local_fp, action, options.dry_run)?;

    let sync = if decision.source_sync {
        sync_source(
            target,
            settings,
            &resolved,
            &options.allow_list,
            rules,
            options.dry_run,
        )?
    } else {
        tracing::debug!("source unchanged for {descriptor}; skipping sync");
        SyncOutcome::Skipped
    };

    Ok(PushReport {
        component: descriptor,
        fingerprint: local_fp,
        decision,
        action,
        orchestration,
        sync,
    })
}
