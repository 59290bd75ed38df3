//! Remote state probe — read-only snapshot of a component's deployed state.
//!
//! The snapshot is captured once per push and consumed read-only by the
//! decision engine. A race window between probe and apply is accepted; the
//! orchestrator re-validates the minimal precondition before destructive
//! writes.

use hoist_core::{ComponentDescriptor, ConfigFingerprint};

use crate::error::PushError;
use crate::remote::{RemoteTarget, SourceMarker};

/// State of the remote component at probe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStateSnapshot {
    pub exists: bool,
    /// Fingerprint of the last-applied settings; `None` means unknown.
    pub fingerprint: Option<ConfigFingerprint>,
    /// Last-synced source marker; `None` means unknown.
    pub source_marker: Option<SourceMarker>,
}

/// Probe the target for `descriptor`.
///
/// Existence probe failures abort the push. Fingerprint and source-marker
/// probe failures degrade the respective field to `None` (unknown) with a
/// logged warning — the decision engine then errs toward re-applying, never
/// toward skipping. This is the one deliberate conservative fallback, not
/// error suppression.
pub fn probe(
    target: &dyn RemoteTarget,
    descriptor: &ComponentDescriptor,
) -> Result<RemoteStateSnapshot, PushError> {
    let exists = target
        .component_exists(descriptor)
        .map_err(|source| PushError::Probe {
            component: descriptor.to_string(),
            source,
        })?;

    if !exists {
        return Ok(RemoteStateSnapshot {
            exists: false,
            fingerprint: None,
            source_marker: None,
        });
    }

    let fingerprint = match target.applied_fingerprint(descriptor) {
        Ok(fp) => fp,
        Err(e) => {
            tracing::warn!(
                "fingerprint probe failed for {descriptor}, forcing config apply: {e}"
            );
            None
        }
    };

    let source_marker = match target.source_marker(descriptor) {
        Ok(marker) => marker,
        Err(e) => {
            tracing::warn!(
                "source marker probe failed for {descriptor}, forcing source sync: {e}"
            );
            None
        }
    };

    Ok(RemoteStateSnapshot {
        exists,
        fingerprint,
        source_marker,
    })
}
