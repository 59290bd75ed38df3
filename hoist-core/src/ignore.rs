//! Ignore rules — glob patterns excluding paths from source sync.
//!
//! Rules are purely pattern-driven: no hidden defaults beyond the empty set.
//! A version-control directory is excluded only if the user lists it.
//! Explicit patterns (from `--ignore`) fully replace file-derived rules,
//! never merge with them.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// Conventional ignore file name under the source root.
pub const IGNORE_FILE_NAME: &str = ".hoistignore";

/// Ordered glob rule set. A path is excluded if it matches any rule.
///
/// Loaded once per invocation, read-only thereafter.
#[derive(Debug)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreRuleSet {
    /// Build a rule set from explicit glob patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidIgnorePattern {
                pattern: pattern.to_string(),
                source: e,
            })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder
            .build()
            .map_err(|e| ConfigError::InvalidIgnorePattern {
                pattern: kept.join(","),
                source: e,
            })?;
        Ok(Self { patterns: kept, set })
    }

    /// The empty rule set — nothing is excluded.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// Derive rules from `<source_root>/.hoistignore`.
    ///
    /// One glob per line; blank lines and `#` comments are skipped.
    /// A missing file yields the empty set.
    pub fn from_source_root(source_root: &Path) -> Result<Self, ConfigError> {
        let path = source_root.join(IGNORE_FILE_NAME);
        if !path.exists() {
            return Ok(Self::empty());
        }
        let contents = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = contents.lines().collect();
        Self::from_patterns(&lines)
    }

    /// Whether `relative_path` matches any rule. Matches are checked against
    /// the path and each of its ancestors, so `node_modules` excludes the
    /// whole subtree.
    pub fn is_ignored(&self, relative_path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let mut current = Some(relative_path);
        while let Some(path) = current {
            if self.set.is_match(path) {
                return true;
            }
            current = path.parent().filter(|p| !p.as_os_str().is_empty());
        }
        false
    }

    /// The retained patterns, in rule order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
