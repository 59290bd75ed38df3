//! Source file enumeration and tree markers.
//!
//! `files_to_send` = (allow-list or all files under the root) minus anything
//! matching an ignore rule. The tree marker is a content hash over that set:
//! sorted relative paths, each with the SHA-256 of its bytes, hashed again.
//! Deterministic across runs and machines — no timestamps involved.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use hoist_core::IgnoreRuleSet;

use crate::error::{io_err, PushError};
use crate::remote::SourceMarker;

/// Compute the set of files to transfer, as sorted root-relative paths.
///
/// An empty `allow_list` means "all files under the root". Ignore rules apply
/// to both branches; allow-listed files matching a rule are dropped too.
pub fn files_to_send(
    root: &Path,
    allow_list: &[PathBuf],
    rules: &IgnoreRuleSet,
) -> Result<Vec<PathBuf>, PushError> {
    let mut files = if allow_list.is_empty() {
        walk_files(root)?
    } else {
        allow_list.to_vec()
    };
    files.retain(|relative| !rules.is_ignored(relative));
    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    files.dedup();
    Ok(files)
}

/// Content hash of the files-to-send set rooted at `root`.
pub fn tree_marker(root: &Path, files: &[PathBuf]) -> Result<SourceMarker, PushError> {
    let mut tree = Sha256::new();
    for relative in files {
        let path = root.join(relative);
        let content = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
        let file_digest = {
            let mut h = Sha256::new();
            h.update(&content);
            hex::encode(h.finalize())
        };
        // Forward slashes keep the record identical across platforms.
        let key = relative.to_string_lossy().replace('\\', "/");
        tree.update(key.as_bytes());
        tree.update(b"\n");
        tree.update(file_digest.as_bytes());
        tree.update(b"\n");
    }
    Ok(SourceMarker(hex::encode(tree.finalize())))
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>, PushError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| PushError::Io {
            path: root.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(relative);
    }
    Ok(files)
}
