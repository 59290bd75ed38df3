//! Directory-backed [`RemoteTarget`].
//!
//! Models a cluster as a directory tree, one component per
//! `<root>/<namespace>/<app>/<component>/`:
//!
//! ```text
//! <root>/
//!   <namespace>/
//!     <app>/
//!       <component>/
//!         meta.json   (settings + fingerprint + source marker)
//!         src/        (synced source tree)
//! ```
//!
//! Metadata writes use the same `.tmp` + rename pattern as the local config
//! store. A missing target root is reported as [`RemoteError::Unreachable`],
//! which is what probe-failure handling keys off in tests.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use hoist_core::{
    labels, ComponentDescriptor, ComponentSettings, ConfigFingerprint, NamespaceName,
};

use crate::remote::{remote_io_err, RemoteError, RemoteTarget, SourceMarker};

/// Component metadata document persisted at `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMeta {
    pub settings: ComponentSettings,
    pub fingerprint: ConfigFingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_marker: Option<SourceMarker>,
    pub labels: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A deployment target rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirTarget {
    root: PathBuf,
}

impl DirTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_reachable(&self) -> Result<(), RemoteError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(RemoteError::Unreachable {
                detail: format!("target root {} does not exist", self.root.display()),
            })
        }
    }

    fn component_dir(&self, descriptor: &ComponentDescriptor) -> PathBuf {
        self.root
            .join(&descriptor.namespace.0)
            .join(&descriptor.app.0)
            .join(&descriptor.name.0)
    }

    fn meta_path(&self, descriptor: &ComponentDescriptor) -> PathBuf {
        self.component_dir(descriptor).join("meta.json")
    }

    fn src_dir(&self, descriptor: &ComponentDescriptor) -> PathBuf {
        self.component_dir(descriptor).join("src")
    }

    fn load_meta(&self, descriptor: &ComponentDescriptor) -> Result<ComponentMeta, RemoteError> {
        let path = self.meta_path(descriptor);
        if !path.exists() {
            return Err(RemoteError::MissingComponent {
                component: descriptor.to_string(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| remote_io_err(&path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_meta(
        &self,
        descriptor: &ComponentDescriptor,
        meta: &ComponentMeta,
    ) -> Result<(), RemoteError> {
        let path = self.meta_path(descriptor);
        let dir = self.component_dir(descriptor);
        std::fs::create_dir_all(&dir).map_err(|e| remote_io_err(&dir, e))?;
        let json = serde_json::to_string_pretty(meta)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| remote_io_err(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| remote_io_err(&path, e))?;
        Ok(())
    }
}

impl RemoteTarget for DirTarget {
    fn namespace_exists(&self, namespace: &NamespaceName) -> Result<bool, RemoteError> {
        self.ensure_reachable()?;
        Ok(self.root.join(&namespace.0).is_dir())
    }

    fn create_namespace(&self, namespace: &NamespaceName) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let dir = self.root.join(&namespace.0);
        std::fs::create_dir_all(&dir).map_err(|e| remote_io_err(&dir, e))?;
        Ok(())
    }

    fn component_exists(&self, descriptor: &ComponentDescriptor) -> Result<bool, RemoteError> {
        self.ensure_reachable()?;
        Ok(self.meta_path(descriptor).exists())
    }

    fn applied_fingerprint(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<ConfigFingerprint>, RemoteError> {
        self.ensure_reachable()?;
        match self.load_meta(descriptor) {
            Ok(meta) => Ok(Some(meta.fingerprint)),
            Err(RemoteError::MissingComponent { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn source_marker(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<SourceMarker>, RemoteError> {
        self.ensure_reachable()?;
        match self.load_meta(descriptor) {
            Ok(meta) => Ok(meta.source_marker),
            Err(RemoteError::MissingComponent { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_component(
        &self,
        settings: &ComponentSettings,
        fingerprint: &ConfigFingerprint,
    ) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let descriptor = settings.descriptor();
        let now = Utc::now();
        // Settings are laid down first; the fingerprint record travels in the
        // same atomic meta write, never ahead of them.
        let meta = ComponentMeta {
            settings: settings.clone(),
            fingerprint: fingerprint.clone(),
            source_marker: None,
            labels: labels::get_labels(&descriptor, &settings.component_type, true),
            created_at: now,
            updated_at: now,
        };
        self.save_meta(&descriptor, &meta)
    }

    fn apply_config(
        &self,
        settings: &ComponentSettings,
        fingerprint: &ConfigFingerprint,
    ) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let descriptor = settings.descriptor();
        let mut meta = self.load_meta(&descriptor)?;
        meta.settings = settings.clone();
        meta.fingerprint = fingerprint.clone();
        meta.labels = labels::get_labels(&descriptor, &settings.component_type, true);
        meta.updated_at = Utc::now();
        self.save_meta(&descriptor, &meta)
    }

    fn list_files(&self, descriptor: &ComponentDescriptor) -> Result<Vec<PathBuf>, RemoteError> {
        self.ensure_reachable()?;
        let src = self.src_dir(descriptor);
        if !src.is_dir() {
            return Ok(vec![]);
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&src).sort_by_file_name() {
            let entry = entry.map_err(|e| RemoteError::Io {
                path: src.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&src)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(relative);
        }
        Ok(files)
    }

    fn upload_file(
        &self,
        descriptor: &ComponentDescriptor,
        root: &Path,
        relative: &Path,
    ) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let from = root.join(relative);
        let to = self.src_dir(descriptor).join(relative);
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| remote_io_err(parent, e))?;
        }
        std::fs::copy(&from, &to).map_err(|e| remote_io_err(&from, e))?;
        Ok(())
    }

    fn remove_files(
        &self,
        descriptor: &ComponentDescriptor,
        relative: &[PathBuf],
    ) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let src = self.src_dir(descriptor);
        for rel in relative {
            let path = src.join(rel);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(remote_io_err(&path, e)),
            }
        }
        Ok(())
    }

    fn trigger_build(
        &self,
        descriptor: &ComponentDescriptor,
        location: &str,
        reference: Option<&str>,
    ) -> Result<String, RemoteError> {
        self.ensure_reachable()?;
        if !self.meta_path(descriptor).exists() {
            return Err(RemoteError::MissingComponent {
                component: descriptor.to_string(),
            });
        }
        let reference = reference.unwrap_or("HEAD");
        let log = format!(
            "build started for {descriptor} from {location}@{reference}\nbuild complete\n"
        );
        let log_path = self.component_dir(descriptor).join("build.log");
        std::fs::write(&log_path, &log).map_err(|e| remote_io_err(&log_path, e))?;
        Ok(log)
    }

    fn record_source_marker(
        &self,
        descriptor: &ComponentDescriptor,
        marker: &SourceMarker,
    ) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let mut meta = self.load_meta(descriptor)?;
        meta.source_marker = Some(marker.clone());
        meta.updated_at = Utc::now();
        self.save_meta(descriptor, &meta)
    }

    fn delete_component(&self, descriptor: &ComponentDescriptor) -> Result<(), RemoteError> {
        self.ensure_reachable()?;
        let dir = self.component_dir(descriptor);
        if !self.meta_path(descriptor).exists() {
            return Err(RemoteError::MissingComponent {
                component: descriptor.to_string(),
            });
        }
        std::fs::remove_dir_all(&dir).map_err(|e| remote_io_err(&dir, e))?;
        Ok(())
    }
}
