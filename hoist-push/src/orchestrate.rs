//! Deployment orchestrator — namespace-first create/apply state machine.
//!
//! `Start → (EnsureNamespace if absent) → (Create | Apply | Skip) → Done`.
//! The action is planned once from the probe snapshot and the decision, then
//! consumed exhaustively. Create re-validates existence immediately before
//! writing; a component that appeared since the probe downgrades the action
//! to Apply instead of clobbering it.

use hoist_core::{ComponentSettings, ConfigFingerprint};

use crate::decision::SyncDecision;
use crate::error::{PushError, PushPhase};
use crate::probe::RemoteStateSnapshot;
use crate::remote::RemoteTarget;

/// What the orchestrator will do for the config path of this push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentAction {
    /// Component absent remotely: create it with full settings.
    Create,
    /// Component exists and settings changed: re-apply config.
    Apply,
    /// Settings unchanged: no config work.
    Skip,
}

/// Outcome of an orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationOutcome {
    Created,
    Applied,
    Skipped,
    /// `--dry-run`: the component would have been created.
    WouldCreate,
    /// `--dry-run`: the config would have been re-applied.
    WouldApply,
}

/// Plan the config-path action from the snapshot and decision.
///
/// Create vs Apply is chosen solely by remote existence; creation always
/// applies settings regardless of the decision's config flag.
pub fn plan_action(snapshot: &RemoteStateSnapshot, decision: &SyncDecision) -> DeploymentAction {
    if !snapshot.exists {
        DeploymentAction::Create
    } else if decision.config_apply {
        DeploymentAction::Apply
    } else {
        DeploymentAction::Skip
    }
}

/// Execute the planned action against the target.
///
/// Namespace creation precedes component work and its failure is fatal to the
/// whole push. Create/apply failures surface the partially-applied state via
/// [`PushError::Orchestration`]; the target's contract guarantees the
/// fingerprint record is written with (after) the settings it describes.
pub fn execute(
    target: &dyn RemoteTarget,
    settings: &ComponentSettings,
    fingerprint: &ConfigFingerprint,
    action: DeploymentAction,
    dry_run: bool,
) -> Result<OrchestrationOutcome, PushError> {
    let descriptor = settings.descriptor();

    if action == DeploymentAction::Skip {
        tracing::debug!("config unchanged for {descriptor}; skipping apply");
        return Ok(OrchestrationOutcome::Skipped);
    }

    if dry_run {
        return Ok(match action {
            DeploymentAction::Create => OrchestrationOutcome::WouldCreate,
            DeploymentAction::Apply => OrchestrationOutcome::WouldApply,
            DeploymentAction::Skip => unreachable!("handled above"),
        });
    }

    let namespace_known = target
        .namespace_exists(&descriptor.namespace)
        .map_err(|source| PushError::Orchestration {
            component: descriptor.to_string(),
            phase: PushPhase::Creation,
            source,
        })?;
    if !namespace_known {
        tracing::info!("creating namespace {}", descriptor.namespace);
        target
            .create_namespace(&descriptor.namespace)
            .map_err(|source| PushError::Orchestration {
                component: descriptor.to_string(),
                phase: PushPhase::Creation,
                source,
            })?;
    }

    match action {
        DeploymentAction::Create => {
            // Minimal precondition re-check: the snapshot may be stale.
            let still_absent = !target
                .component_exists(&descriptor)
                .map_err(|source| PushError::Orchestration {
                    component: descriptor.to_string(),
                    phase: PushPhase::Creation,
                    source,
                })?;
            if still_absent {
                tracing::info!("creating {} component {descriptor}", settings.component_type);
                target
                    .create_component(settings, fingerprint)
                    .map_err(|source| PushError::Orchestration {
                        component: descriptor.to_string(),
                        phase: PushPhase::Creation,
                        source,
                    })?;
                Ok(OrchestrationOutcome::Created)
            } else {
                tracing::warn!(
                    "{descriptor} appeared between probe and create; applying config instead"
                );
                apply(target, settings, fingerprint)
            }
        }
        DeploymentAction::Apply => apply(target, settings, fingerprint),
        DeploymentAction::Skip => unreachable!("handled above"),
    }
}

fn apply(
    target: &dyn RemoteTarget,
    settings: &ComponentSettings,
    fingerprint: &ConfigFingerprint,
) -> Result<OrchestrationOutcome, PushError> {
    let descriptor = settings.descriptor();
    tracing::info!("applying component settings to {descriptor}");
    target
        .apply_config(settings, fingerprint)
        .map_err(|source| PushError::Orchestration {
            component: descriptor.to_string(),
            phase: PushPhase::ConfigApply,
            source,
        })?;
    Ok(OrchestrationOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use hoist_core::fingerprint;
    use hoist_core::types::{
        AppName, ComponentName, NamespaceName, ResourceBounds, SourceDescriptor, SourceType,
    };

    use crate::decision::{decide, PushFlags};
    use crate::dir_target::DirTarget;
    use crate::probe::probe;
    use crate::remote::SourceMarker;

    fn settings(name: &str) -> ComponentSettings {
        ComponentSettings {
            name: ComponentName::from(name),
            app: AppName::from("shop"),
            namespace: NamespaceName::from("dev"),
            component_type: "nodejs".to_string(),
            source: SourceDescriptor {
                source_type: SourceType::Local,
                location: ".".to_string(),
                reference: None,
            },
            env: Default::default(),
            storage: vec![],
            resources: ResourceBounds::default(),
        }
    }

    fn full_decision() -> SyncDecision {
        SyncDecision {
            config_apply: true,
            source_sync: true,
            reasons: vec![],
        }
    }

    #[test]
    fn plan_prefers_create_for_absent_component() {
        let snapshot = RemoteStateSnapshot {
            exists: false,
            fingerprint: None,
            source_marker: None,
        };
        assert_eq!(plan_action(&snapshot, &full_decision()), DeploymentAction::Create);
    }

    #[test]
    fn plan_apply_vs_skip_follows_decision_for_existing() {
        let snapshot = RemoteStateSnapshot {
            exists: true,
            fingerprint: Some(hoist_core::ConfigFingerprint::from("aa")),
            source_marker: Some(SourceMarker::from("mm")),
        };
        assert_eq!(plan_action(&snapshot, &full_decision()), DeploymentAction::Apply);

        let skip = SyncDecision {
            config_apply: false,
            source_sync: true,
            reasons: vec![],
        };
        assert_eq!(plan_action(&snapshot, &skip), DeploymentAction::Skip);
    }

    #[test]
    fn create_ensures_namespace_first() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();

        assert!(!target.namespace_exists(&s.namespace).unwrap());
        let outcome = execute(&target, &s, &fp, DeploymentAction::Create, false).unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Created);
        assert!(target.namespace_exists(&s.namespace).unwrap());
        assert!(target.component_exists(&s.descriptor()).unwrap());
    }

    #[test]
    fn create_records_fingerprint_with_settings() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();
        execute(&target, &s, &fp, DeploymentAction::Create, false).unwrap();
        assert_eq!(
            target.applied_fingerprint(&s.descriptor()).unwrap(),
            Some(fp)
        );
    }

    #[test]
    fn stale_create_downgrades_to_apply() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();

        // Another process created the component after our probe.
        target.create_component(&s, &fp).unwrap();

        let mut changed = s.clone();
        changed.resources.max_memory = Some("2Gi".to_string());
        let fp2 = fingerprint(&changed).unwrap();
        let outcome = execute(&target, &changed, &fp2, DeploymentAction::Create, false).unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Applied);
        assert_eq!(
            target.applied_fingerprint(&s.descriptor()).unwrap(),
            Some(fp2)
        );
    }

    #[test]
    fn skip_performs_no_writes() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();
        let outcome = execute(&target, &s, &fp, DeploymentAction::Skip, false).unwrap();
        assert_eq!(outcome, OrchestrationOutcome::Skipped);
        assert!(!target.namespace_exists(&s.namespace).unwrap());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();
        let outcome = execute(&target, &s, &fp, DeploymentAction::Create, true).unwrap();
        assert_eq!(outcome, OrchestrationOutcome::WouldCreate);
        assert!(!target.component_exists(&s.descriptor()).unwrap());
    }

    #[test]
    fn unreachable_target_fails_with_creation_phase() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path().join("gone"));
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();
        let err = execute(&target, &s, &fp, DeploymentAction::Create, false).unwrap_err();
        match err {
            PushError::Orchestration { phase, .. } => assert_eq!(phase, PushPhase::Creation),
            other => panic!("expected orchestration error, got {other:?}"),
        }
    }

    #[test]
    fn probe_decide_plan_execute_chain_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let target = DirTarget::new(tmp.path());
        let s = settings("frontend");
        let fp = fingerprint(&s).unwrap();
        let marker = SourceMarker::from("mm");

        // First push: create.
        let snap = probe(&target, &s.descriptor()).unwrap();
        let d = decide(&fp, &marker, &snap, &PushFlags::default());
        let action = plan_action(&snap, &d);
        assert_eq!(action, DeploymentAction::Create);
        execute(&target, &s, &fp, action, false).unwrap();
        target.record_source_marker(&s.descriptor(), &marker).unwrap();

        // Second push with no local changes: skip.
        let snap = probe(&target, &s.descriptor()).unwrap();
        let d = decide(&fp, &marker, &snap, &PushFlags::default());
        assert!(d.nothing_to_do());
        assert_eq!(plan_action(&snap, &d), DeploymentAction::Skip);
    }
}
