//! The remote execution target, specified at its interface boundary.
//!
//! The push engine never talks to a cluster directly; everything goes through
//! [`RemoteTarget`]. Transport internals (copying bytes into a running
//! workload, building images, creating deployment resources) live behind this
//! trait. [`crate::dir_target::DirTarget`] is the directory-backed
//! implementation used by the CLI and tests.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hoist_core::{ComponentDescriptor, ComponentSettings, ConfigFingerprint, NamespaceName};

/// Opaque token describing the last-synced state of a component's source
/// tree, stored as remote metadata. Compared only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMarker(pub String);

impl fmt::Display for SourceMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SourceMarker {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceMarker {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Errors crossing the remote interface boundary.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The target could not be reached at all.
    #[error("remote target unreachable: {detail}")]
    Unreachable { detail: String },

    /// The target rejected the caller's credentials.
    #[error("permission denied by remote target: {detail}")]
    PermissionDenied { detail: String },

    /// An operation referenced a component the target does not know.
    #[error("component {component} not found on remote target")]
    MissingComponent { component: String },

    /// A remote build was triggered but failed.
    #[error("remote build failed: {detail}")]
    BuildFailed { detail: String },

    /// Underlying I/O failure on the target side, with annotated path.
    #[error("remote I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Metadata document serialization error.
    #[error("remote metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`RemoteError::Io`].
pub(crate) fn remote_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}

/// Interface to the remote execution target.
///
/// Contract points the engine relies on:
/// - `create_component` / `apply_config` must record the given fingerprint
///   only after the settings it describes are applied, never before.
/// - `record_source_marker` is called by the synchronizer only after all
///   file writes for the step are acknowledged.
/// - Read methods (`*_exists`, `applied_fingerprint`, `source_marker`,
///   `list_files`) are side-effect free.
pub trait RemoteTarget {
    fn namespace_exists(&self, namespace: &NamespaceName) -> Result<bool, RemoteError>;
    fn create_namespace(&self, namespace: &NamespaceName) -> Result<(), RemoteError>;

    fn component_exists(&self, descriptor: &ComponentDescriptor) -> Result<bool, RemoteError>;

    /// Fingerprint of the settings last applied to the component, if recorded.
    fn applied_fingerprint(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<ConfigFingerprint>, RemoteError>;

    /// Last-synced source marker, if recorded.
    fn source_marker(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<SourceMarker>, RemoteError>;

    fn create_component(
        &self,
        settings: &ComponentSettings,
        fingerprint: &ConfigFingerprint,
    ) -> Result<(), RemoteError>;

    fn apply_config(
        &self,
        settings: &ComponentSettings,
        fingerprint: &ConfigFingerprint,
    ) -> Result<(), RemoteError>;

    /// Relative paths of all source files currently present on the target.
    fn list_files(&self, descriptor: &ComponentDescriptor) -> Result<Vec<PathBuf>, RemoteError>;

    /// Copy one file (`relative` under `root`) into the component's tree.
    fn upload_file(
        &self,
        descriptor: &ComponentDescriptor,
        root: &Path,
        relative: &Path,
    ) -> Result<(), RemoteError>;

    /// Remove files from the component's tree (full-sync pruning).
    fn remove_files(
        &self,
        descriptor: &ComponentDescriptor,
        relative: &[PathBuf],
    ) -> Result<(), RemoteError>;

    /// Trigger a remote build from a repository reference. Returns the build
    /// log for callers that want to surface it.
    fn trigger_build(
        &self,
        descriptor: &ComponentDescriptor,
        location: &str,
        reference: Option<&str>,
    ) -> Result<String, RemoteError>;

    /// Persist the source marker. Called only after all transfers for the
    /// step are acknowledged.
    fn record_source_marker(
        &self,
        descriptor: &ComponentDescriptor,
        marker: &SourceMarker,
    ) -> Result<(), RemoteError>;

    fn delete_component(&self, descriptor: &ComponentDescriptor) -> Result<(), RemoteError>;
}
