//! Error types for hoist-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from local configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse component config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No component config file at the expected path.
    #[error("component config not found at {path}; run `hoist config set` in the component directory first")]
    ConfigNotFound { path: PathBuf },

    /// Source location carried a URI scheme other than `file://`.
    #[error("component {component} has unsupported source scheme '{scheme}'; only plain paths and file:// are accepted")]
    UnsupportedSourceScheme { component: String, scheme: String },

    /// `config set`/`unset` was given a parameter outside the whitelist.
    #[error("unknown configuration parameter '{name}'; supported: {supported}")]
    UnknownParameter { name: String, supported: String },

    /// A parameter value failed validation.
    #[error("invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// Ignore rule file contained an invalid glob pattern.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
