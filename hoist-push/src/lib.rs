//! # hoist-push
//!
//! The push / reconciliation engine: probe remote state, decide what
//! changed, orchestrate create/apply, and synchronize source selectively.
//!
//! Call [`pipeline::push`] to reconcile one component against a
//! [`RemoteTarget`].

pub mod decision;
pub mod dir_target;
pub mod error;
pub mod files;
pub mod orchestrate;
pub mod pipeline;
pub mod probe;
pub mod remote;
pub mod sync;

pub use decision::{PushFlags, SyncDecision};
pub use dir_target::DirTarget;
pub use error::{PushError, PushPhase};
pub use orchestrate::{DeploymentAction, OrchestrationOutcome};
pub use pipeline::{push, PushOptions, PushReport};
pub use probe::RemoteStateSnapshot;
pub use remote::{RemoteError, RemoteTarget, SourceMarker};
pub use sync::SyncOutcome;
