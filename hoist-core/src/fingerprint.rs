//! Content fingerprint over component settings.
//!
//! The digest is SHA-256 of the settings' canonical JSON form. serde_json's
//! default `Value` map is BTreeMap-backed, so object keys come out sorted and
//! the digest is independent of struct field order. Two settings records that
//! are field-wise equal always fingerprint identically, across runs and
//! machines.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ConfigError;
use crate::types::ComponentSettings;

/// Deterministic digest of a [`ComponentSettings`] record.
///
/// Opaque beyond equality comparison; also persisted remotely after an apply
/// so later probes can compare against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigFingerprint(pub String);

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ConfigFingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConfigFingerprint {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Compute the fingerprint of a settings record. Pure and deterministic.
pub fn fingerprint(settings: &ComponentSettings) -> Result<ConfigFingerprint, ConfigError> {
    // Round-trip through Value to get sorted object keys.
    let canonical = serde_json::to_value(settings).map_err(serde_json_to_io)?;
    let bytes = serde_json::to_vec(&canonical).map_err(serde_json_to_io)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(ConfigFingerprint(hex::encode(hasher.finalize())))
}

fn serde_json_to_io(e: serde_json::Error) -> ConfigError {
    ConfigError::Io(std::io::Error::other(e))
}
