//! Domain types for a hoist component.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Map-valued settings use `BTreeMap` so serialization order is stable — the
//! config fingerprint depends on it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a deployable component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName(pub String);

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ComponentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ComponentName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name for the application a component belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppName(pub String);

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name for the target namespace (project) on the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceName(pub String);

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for NamespaceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NamespaceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How the component's source artifacts reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// A directory synced file-by-file.
    #[default]
    Local,
    /// A single file synced with its parent directory as transfer context.
    Binary,
    /// A remote build triggered from a repository reference; no file transfer.
    Repository,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Local => write!(f, "local"),
            SourceType::Binary => write!(f, "binary"),
            SourceType::Repository => write!(f, "repository"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Where the component's source lives and how it is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// A filesystem path, `file://` URI (local/binary) or repository URL.
    pub location: String,
    /// Repository reference (branch, tag) for [`SourceType::Repository`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Resource bounds applied to the deployed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<String>,
}

/// A persistent volume request attached to the component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSpec {
    pub name: String,
    pub size: String,
    pub mount_path: String,
}

/// The full declarative record for one component.
///
/// Owned by the local configuration store for the duration of a push;
/// read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSettings {
    pub name: ComponentName,
    pub app: AppName,
    pub namespace: NamespaceName,
    /// Builder image / component type, e.g. `nodejs` or `python:3.11`.
    pub component_type: String,
    pub source: SourceDescriptor,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<StorageSpec>,
    #[serde(default)]
    pub resources: ResourceBounds,
}

impl ComponentSettings {
    /// The identity tuple used as the join key against remote state.
    pub fn descriptor(&self) -> ComponentDescriptor {
        ComponentDescriptor {
            name: self.name.clone(),
            app: self.app.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Identity tuple for a component. Immutable once a push begins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: ComponentName,
    pub app: AppName,
    pub namespace: NamespaceName,
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.app, self.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
