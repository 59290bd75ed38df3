//! Selective file synchronizer.
//!
//! Local sources walk the tree; binary sources sync the single file with its
//! parent directory as transfer context; repository sources trigger a remote
//! build and never enumerate files. The source marker is recorded only after
//! every transfer for the step is acknowledged.

use std::path::{Path, PathBuf};

use hoist_core::{ComponentSettings, IgnoreRuleSet, SourceType};

use crate::error::PushError;
use crate::files::{files_to_send, tree_marker};
use crate::remote::{RemoteTarget, SourceMarker};

/// Outcome of the source path of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Files were copied (and, on a full sync, remote strays pruned).
    Transferred {
        sent: Vec<PathBuf>,
        deleted: Vec<PathBuf>,
    },
    /// A remote build was triggered from a repository reference.
    Built { log: String },
    /// The decision engine found the source unchanged.
    Skipped,
    /// `--dry-run`: these files would have been sent / pruned.
    WouldTransfer {
        files: Vec<PathBuf>,
        deleted: Vec<PathBuf>,
    },
    /// `--dry-run`: a remote build would have been triggered.
    WouldBuild,
}

/// Transfer root and allow-list for a resolved source.
///
/// Binary sources keep the parent directory as the root so co-located build
/// metadata stays in the transfer context.
fn source_layout(settings: &ComponentSettings, resolved: &Path) -> (PathBuf, Vec<PathBuf>) {
    match settings.source.source_type {
        SourceType::Binary => {
            let root = resolved
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let allow = resolved
                .file_name()
                .map(|name| vec![PathBuf::from(name)])
                .unwrap_or_default();
            (root, allow)
        }
        _ => (resolved.to_path_buf(), Vec::new()),
    }
}

/// The current computed state of the local source, as an opaque marker.
///
/// Local/binary sources hash the files-to-send set; repository sources are
/// identified by `location@reference`.
pub fn local_source_marker(
    settings: &ComponentSettings,
    resolved: &Path,
    rules: &IgnoreRuleSet,
) -> Result<SourceMarker, PushError> {
    if settings.source.source_type == SourceType::Repository {
        return Ok(repository_marker(settings));
    }
    let (root, allow) = source_layout(settings, resolved);
    let files = files_to_send(&root, &allow, rules)?;
    tree_marker(&root, &files)
}

fn repository_marker(settings: &ComponentSettings) -> SourceMarker {
    let reference = settings.source.reference.as_deref().unwrap_or("HEAD");
    SourceMarker(format!("{}@{}", settings.source.location, reference))
}

/// Synchronize the component's source onto the target.
///
/// `allow_list` narrows a local sync to an explicit file set (incremental —
/// no deletion scan). Full syncs prune remote files absent locally and not
/// excluded by ignore rules. The marker is recorded only when the synced set
/// covers the whole source (full local sync, binary); an incremental sync
/// leaves the previous marker so the next push re-checks.
pub fn sync_source(
    target: &dyn RemoteTarget,
    settings: &ComponentSettings,
    resolved: &Path,
    allow_list: &[PathBuf],
    rules: &IgnoreRuleSet,
    dry_run: bool,
) -> Result<SyncOutcome, PushError> {
    let descriptor = settings.descriptor();

    if settings.source.source_type == SourceType::Repository {
        if dry_run {
            return Ok(SyncOutcome::WouldBuild);
        }
        tracing::info!("triggering remote build for {descriptor}");
        let log = target
            .trigger_build(
                &descriptor,
                &settings.source.location,
                settings.source.reference.as_deref(),
            )
            .map_err(|source| PushError::Sync {
                component: descriptor.to_string(),
                sent: vec![],
                source,
            })?;
        record_marker(target, settings, &repository_marker(settings))?;
        return Ok(SyncOutcome::Built { log });
    }

    let (root, mut allow) = source_layout(settings, resolved);
    let caller_narrowed = !allow_list.is_empty();
    if caller_narrowed && settings.source.source_type == SourceType::Local {
        allow = allow_list.to_vec();
    }
    let incremental = caller_narrowed && settings.source.source_type == SourceType::Local;

    let files = files_to_send(&root, &allow, rules)?;
    let deletions = if incremental {
        Vec::new()
    } else {
        stale_remote_files(target, settings, &files, rules)?
    };

    if dry_run {
        return Ok(SyncOutcome::WouldTransfer {
            files,
            deleted: deletions,
        });
    }

    let mut sent: Vec<PathBuf> = Vec::new();
    for relative in &files {
        target
            .upload_file(&descriptor, &root, relative)
            .map_err(|source| PushError::Sync {
                component: descriptor.to_string(),
                sent: sent.clone(),
                source,
            })?;
        tracing::debug!("sent {}", relative.display());
        sent.push(relative.clone());
    }

    if !deletions.is_empty() {
        target
            .remove_files(&descriptor, &deletions)
            .map_err(|source| PushError::Sync {
                component: descriptor.to_string(),
                sent: sent.clone(),
                source,
            })?;
    }

    if !incremental {
        let marker = tree_marker(&root, &files)?;
        record_marker(target, settings, &marker)?;
    } else {
        tracing::debug!("incremental sync for {descriptor}; source marker left unchanged");
    }

    Ok(SyncOutcome::Transferred {
        sent,
        deleted: deletions,
    })
}

fn stale_remote_files(
    target: &dyn RemoteTarget,
    settings: &ComponentSettings,
    local: &[PathBuf],
    rules: &IgnoreRuleSet,
) -> Result<Vec<PathBuf>, PushError> {
    let descriptor = settings.descriptor();
    let remote = target
        .list_files(&descriptor)
        .map_err(|source| PushError::Sync {
            component: descriptor.to_string(),
            sent: vec![],
            source,
        })?;
    let mut stale: Vec<PathBuf> = remote
        .into_iter()
        .filter(|path| !local.contains(path) && !rules.is_ignored(path))
        .collect();
    stale.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(stale)
}

fn record_marker(
    target: &dyn RemoteTarget,
    settings: &ComponentSettings,
    marker: &SourceMarker,
) -> Result<(), PushError> {
    let descriptor = settings.descriptor();
    target
        .record_source_marker(&descriptor, marker)
        .map_err(|source| PushError::Sync {
            component: descriptor.to_string(),
            sent: vec![],
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use hoist_core::fingerprint;
    use hoist_core::types::{
        AppName, ComponentName, NamespaceName, ResourceBounds, SourceDescriptor,
    };

    use crate::dir_target::DirTarget;

    fn settings(source_type: SourceType, location: &str) -> ComponentSettings {
        ComponentSettings {
            name: ComponentName::from("frontend"),
            app: AppName::from("shop"),
            namespace: NamespaceName::from("dev"),
            component_type: "nodejs".to_string(),
            source: SourceDescriptor {
                source_type,
                location: location.to_string(),
                reference: None,
            },
            env: Default::default(),
            storage: vec![],
            resources: ResourceBounds::default(),
        }
    }

    fn created(target: &DirTarget, s: &ComponentSettings) {
        target
            .create_component(s, &fingerprint(s).expect("fingerprint"))
            .expect("create");
    }

    fn local_tree() -> TempDir {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(tmp.path().join("c")).expect("mkdir");
        std::fs::write(tmp.path().join("a.txt"), "alpha").expect("write");
        std::fs::write(tmp.path().join("b.log"), "log").expect("write");
        std::fs::write(tmp.path().join("c/d.txt"), "delta").expect("write");
        tmp
    }

    #[test]
    fn full_local_sync_transfers_and_records_marker() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&target, &s);

        let rules = IgnoreRuleSet::from_patterns(&["*.log"]).unwrap();
        let outcome = sync_source(&target, &s, source.path(), &[], &rules, false).unwrap();
        match outcome {
            SyncOutcome::Transferred { sent, deleted } => {
                assert_eq!(sent, vec![PathBuf::from("a.txt"), PathBuf::from("c/d.txt")]);
                assert!(deleted.is_empty());
            }
            other => panic!("expected transfer, got {other:?}"),
        }

        let expected = local_source_marker(&s, source.path(), &rules).unwrap();
        assert_eq!(
            target.source_marker(&s.descriptor()).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn full_sync_prunes_remote_strays() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&target, &s);

        sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), false).unwrap();

        std::fs::remove_file(source.path().join("a.txt")).unwrap();
        let outcome =
            sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), false).unwrap();
        match outcome {
            SyncOutcome::Transferred { deleted, .. } => {
                assert_eq!(deleted, vec![PathBuf::from("a.txt")]);
            }
            other => panic!("expected transfer, got {other:?}"),
        }
        let listed = target.list_files(&s.descriptor()).unwrap();
        assert!(!listed.contains(&PathBuf::from("a.txt")));
    }

    #[test]
    fn ignored_remote_files_are_never_pruned() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&target, &s);

        // First sync without rules lands b.log remotely.
        sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), false).unwrap();

        // Later syncs exclude *.log locally; the remote copy must survive.
        let rules = IgnoreRuleSet::from_patterns(&["*.log"]).unwrap();
        sync_source(&target, &s, source.path(), &[], &rules, false).unwrap();
        let listed = target.list_files(&s.descriptor()).unwrap();
        assert!(listed.contains(&PathBuf::from("b.log")));
    }

    #[test]
    fn incremental_sync_skips_deletion_scan_and_marker() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&target, &s);

        sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), false).unwrap();
        let marker_before = target.source_marker(&s.descriptor()).unwrap();

        std::fs::remove_file(source.path().join("a.txt")).unwrap();
        std::fs::write(source.path().join("c/d.txt"), "delta v2").unwrap();
        let allow = vec![PathBuf::from("c/d.txt")];
        let outcome = sync_source(
            &target,
            &s,
            source.path(),
            &allow,
            &IgnoreRuleSet::empty(),
            false,
        )
        .unwrap();
        match outcome {
            SyncOutcome::Transferred { sent, deleted } => {
                assert_eq!(sent, allow);
                assert!(deleted.is_empty(), "incremental sync must not prune");
            }
            other => panic!("expected transfer, got {other:?}"),
        }
        // a.txt still remote, marker untouched.
        assert!(target
            .list_files(&s.descriptor())
            .unwrap()
            .contains(&PathBuf::from("a.txt")));
        assert_eq!(target.source_marker(&s.descriptor()).unwrap(), marker_before);
    }

    #[test]
    fn binary_source_syncs_one_file_with_parent_context() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Binary, "a.txt");
        created(&target, &s);

        let resolved = source.path().join("a.txt");
        let outcome =
            sync_source(&target, &s, &resolved, &[], &IgnoreRuleSet::empty(), false).unwrap();
        match outcome {
            SyncOutcome::Transferred { sent, deleted } => {
                assert_eq!(sent, vec![PathBuf::from("a.txt")]);
                assert!(deleted.is_empty());
            }
            other => panic!("expected transfer, got {other:?}"),
        }
        assert!(target.source_marker(&s.descriptor()).unwrap().is_some());
    }

    #[test]
    fn repository_source_triggers_build_without_enumeration() {
        let remote = TempDir::new().unwrap();
        let target = DirTarget::new(remote.path());
        let mut s = settings(SourceType::Repository, "https://example.com/shop.git");
        s.source.reference = Some("main".to_string());
        created(&target, &s);

        let outcome = sync_source(
            &target,
            &s,
            Path::new("unused"),
            &[],
            &IgnoreRuleSet::empty(),
            false,
        )
        .unwrap();
        match outcome {
            SyncOutcome::Built { log } => assert!(log.contains("shop.git@main")),
            other => panic!("expected build, got {other:?}"),
        }
        assert_eq!(
            target.source_marker(&s.descriptor()).unwrap(),
            Some(SourceMarker::from("https://example.com/shop.git@main"))
        );
    }

    #[test]
    fn dry_run_reports_plan_without_side_effects() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let target = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&target, &s);

        let outcome =
            sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), true).unwrap();
        match outcome {
            SyncOutcome::WouldTransfer { files, .. } => assert_eq!(files.len(), 3),
            other => panic!("expected would-transfer, got {other:?}"),
        }
        assert!(target.list_files(&s.descriptor()).unwrap().is_empty());
        assert_eq!(target.source_marker(&s.descriptor()).unwrap(), None);
    }

    /// Delegates to a [`DirTarget`] but fails the upload of one file.
    struct FailingUpload {
        inner: DirTarget,
        fail_on: PathBuf,
    }

    impl RemoteTarget for FailingUpload {
        fn namespace_exists(
            &self,
            ns: &hoist_core::NamespaceName,
        ) -> Result<bool, crate::remote::RemoteError> {
            self.inner.namespace_exists(ns)
        }
        fn create_namespace(
            &self,
            ns: &hoist_core::NamespaceName,
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.create_namespace(ns)
        }
        fn component_exists(
            &self,
            d: &hoist_core::ComponentDescriptor,
        ) -> Result<bool, crate::remote::RemoteError> {
            self.inner.component_exists(d)
        }
        fn applied_fingerprint(
            &self,
            d: &hoist_core::ComponentDescriptor,
        ) -> Result<Option<hoist_core::ConfigFingerprint>, crate::remote::RemoteError> {
            self.inner.applied_fingerprint(d)
        }
        fn source_marker(
            &self,
            d: &hoist_core::ComponentDescriptor,
        ) -> Result<Option<SourceMarker>, crate::remote::RemoteError> {
            self.inner.source_marker(d)
        }
        fn create_component(
            &self,
            s: &ComponentSettings,
            fp: &hoist_core::ConfigFingerprint,
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.create_component(s, fp)
        }
        fn apply_config(
            &self,
            s: &ComponentSettings,
            fp: &hoist_core::ConfigFingerprint,
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.apply_config(s, fp)
        }
        fn list_files(
            &self,
            d: &hoist_core::ComponentDescriptor,
        ) -> Result<Vec<PathBuf>, crate::remote::RemoteError> {
            self.inner.list_files(d)
        }
        fn upload_file(
            &self,
            d: &hoist_core::ComponentDescriptor,
            root: &Path,
            relative: &Path,
        ) -> Result<(), crate::remote::RemoteError> {
            if relative == self.fail_on {
                return Err(crate::remote::RemoteError::Unreachable {
                    detail: "connection reset mid-transfer".to_string(),
                });
            }
            self.inner.upload_file(d, root, relative)
        }
        fn remove_files(
            &self,
            d: &hoist_core::ComponentDescriptor,
            relative: &[PathBuf],
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.remove_files(d, relative)
        }
        fn trigger_build(
            &self,
            d: &hoist_core::ComponentDescriptor,
            location: &str,
            reference: Option<&str>,
        ) -> Result<String, crate::remote::RemoteError> {
            self.inner.trigger_build(d, location, reference)
        }
        fn record_source_marker(
            &self,
            d: &hoist_core::ComponentDescriptor,
            marker: &SourceMarker,
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.record_source_marker(d, marker)
        }
        fn delete_component(
            &self,
            d: &hoist_core::ComponentDescriptor,
        ) -> Result<(), crate::remote::RemoteError> {
            self.inner.delete_component(d)
        }
    }

    #[test]
    fn partial_failure_reports_files_already_sent() {
        let remote = TempDir::new().unwrap();
        let source = local_tree();
        let inner = DirTarget::new(remote.path());
        let s = settings(SourceType::Local, ".");
        created(&inner, &s);

        // Files go out in sorted order: a.txt, b.log, c/d.txt.
        let target = FailingUpload {
            inner,
            fail_on: PathBuf::from("b.log"),
        };
        let err = sync_source(&target, &s, source.path(), &[], &IgnoreRuleSet::empty(), false)
            .unwrap_err();
        match err {
            PushError::Sync { sent, .. } => {
                assert_eq!(sent, vec![PathBuf::from("a.txt")]);
            }
            other => panic!("expected sync error, got {other:?}"),
        }
        // The marker must not have been recorded for the failed step.
        assert_eq!(target.inner.source_marker(&s.descriptor()).unwrap(), None);
    }

    #[test]
    fn local_marker_matches_repository_token_scheme() {
        let mut s = settings(SourceType::Repository, "https://example.com/shop.git");
        s.source.reference = Some("v2".to_string());
        let marker =
            local_source_marker(&s, Path::new("unused"), &IgnoreRuleSet::empty()).unwrap();
        assert_eq!(marker, SourceMarker::from("https://example.com/shop.git@v2"));
    }
}
