//! Change decision engine.
//!
//! Pure function of the local fingerprint, the local source marker, and the
//! probed remote snapshot — no side effects. Axis precedence:
//! 1. Component absent remotely: create implies both config and source.
//! 2. Forced flag: that axis is set directly, the other stays computed.
//! 3. Fingerprint / marker comparison, where an absent remote record means
//!    unknown — never "matches".
//!
//! The engine errs toward redundant work: an unnecessary re-apply is far
//! cheaper than a silently missed one.

use hoist_core::ConfigFingerprint;

use crate::probe::RemoteStateSnapshot;
use crate::remote::SourceMarker;

/// Explicit caller overrides (`--config` / `--source`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushFlags {
    pub force_config: bool,
    pub force_source: bool,
}

impl PushFlags {
    pub fn any(&self) -> bool {
        self.force_config || self.force_source
    }
}

/// The verdict driving orchestrator and synchronizer. Computed once,
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDecision {
    pub config_apply: bool,
    pub source_sync: bool,
    /// Human-readable reasons, one per axis that needs work.
    pub reasons: Vec<String>,
}

impl SyncDecision {
    pub fn nothing_to_do(&self) -> bool {
        !self.config_apply && !self.source_sync
    }
}

/// Decide what this push must do.
pub fn decide(
    local_fingerprint: &ConfigFingerprint,
    local_marker: &SourceMarker,
    snapshot: &RemoteStateSnapshot,
    flags: &PushFlags,
) -> SyncDecision {
    if !snapshot.exists {
        return SyncDecision {
            config_apply: true,
            source_sync: true,
            reasons: vec!["component does not exist remotely; creation implies config and source".to_string()],
        };
    }

    let mut reasons = Vec::new();

    let config_apply = if flags.force_config {
        reasons.push("config apply forced by --config".to_string());
        true
    } else {
        match &snapshot.fingerprint {
            None => {
                reasons.push(
                    "no settings fingerprint recorded remotely; treating as unknown".to_string(),
                );
                true
            }
            Some(remote) if remote != local_fingerprint => {
                reasons.push("local settings fingerprint differs from remote".to_string());
                true
            }
            Some(_) => false,
        }
    };

    let source_sync = if flags.force_source {
        reasons.push("source sync forced by --source".to_string());
        true
    } else {
        match &snapshot.source_marker {
            None => {
                reasons.push("no source marker recorded remotely; treating as unknown".to_string());
                true
            }
            Some(remote) if remote != local_marker => {
                reasons.push("local source tree differs from last-synced marker".to_string());
                true
            }
            Some(_) => false,
        }
    };

    SyncDecision {
        config_apply,
        source_sync,
        reasons,
    }
}
