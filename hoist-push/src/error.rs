//! Error types for hoist-push.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use hoist_core::error::ConfigError;

use crate::remote::RemoteError;

/// The push phase an error belongs to, surfaced in every failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushPhase {
    Validation,
    Probe,
    Creation,
    ConfigApply,
    SourceSync,
}

impl fmt::Display for PushPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushPhase::Validation => write!(f, "validation"),
            PushPhase::Probe => write!(f, "probe"),
            PushPhase::Creation => write!(f, "creation"),
            PushPhase::ConfigApply => write!(f, "config-apply"),
            PushPhase::SourceSync => write!(f, "source-sync"),
        }
    }
}

/// All errors that can arise from a push.
#[derive(Debug, Error)]
pub enum PushError {
    /// Local settings missing or invalid. Fatal, no retry.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote existence probe failed. Fatal — never silently degraded.
    #[error("probe failed for component {component}: {source}")]
    Probe {
        component: String,
        #[source]
        source: RemoteError,
    },

    /// `--source` alone against a component that does not exist remotely.
    #[error("component {component} does not exist and hence cannot push only source; run `hoist push` without flags or with both --source and --config")]
    SourceOnlyOnMissingComponent { component: String },

    /// Create or apply failed remotely. The component may now exist with
    /// incomplete settings — a documented inconsistency window.
    #[error("{phase} failed for component {component} (remote state may be partially applied): {source}")]
    Orchestration {
        component: String,
        phase: PushPhase,
        #[source]
        source: RemoteError,
    },

    /// Source transfer failed partway. `sent` lists the files acknowledged
    /// before the failure so a re-run can be incremental.
    #[error("source-sync failed for component {component} after {} file(s) transferred: {source}", sent.len())]
    Sync {
        component: String,
        sent: Vec<PathBuf>,
        #[source]
        source: RemoteError,
    },

    /// An I/O error while enumerating or hashing local source files.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PushError {
    /// The phase the error belongs to, for exit messages.
    pub fn phase(&self) -> PushPhase {
        match self {
            PushError::Config(_) => PushPhase::Validation,
            PushError::Probe { .. } => PushPhase::Probe,
            PushError::SourceOnlyOnMissingComponent { .. } => PushPhase::Validation,
            PushError::Orchestration { phase, .. } => *phase,
            PushError::Sync { .. } | PushError::Io { .. } => PushPhase::SourceSync,
        }
    }
}

/// Convenience constructor for [`PushError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PushError {
    PushError::Io {
        path: path.into(),
        source,
    }
}
