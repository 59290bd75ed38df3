//! Hoist core library — domain types, local config store, fingerprints.
//!
//! Public API surface:
//! - [`types`] — newtypes and the component settings record
//! - [`config`] — per-context load / save / parameter access
//! - [`fingerprint`] — deterministic settings digest
//! - [`ignore`] — glob rules excluding paths from source sync
//! - [`labels`] — remote object label keys
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ignore;
pub mod labels;
pub mod types;

pub use error::ConfigError;
pub use fingerprint::{fingerprint, ConfigFingerprint};
pub use ignore::IgnoreRuleSet;
pub use types::{
    AppName, ComponentDescriptor, ComponentName, ComponentSettings, NamespaceName, ResourceBounds,
    SourceDescriptor, SourceType, StorageSpec,
};
