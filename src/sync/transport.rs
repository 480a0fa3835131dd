//! The transport seam and the types it speaks.

use super::TransportError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Push,
    Pull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// One replicated path, relative to the chest folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl Change {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// One-directional replication of the chest folder to or from a single remote.
///
/// Implementations mirror: new and changed entries are copied, entries missing from
/// the source are deleted from the destination, excluded entries are neither copied
/// nor deleted. A dry run reports the same changes without performing them.
pub trait Transport {
    fn push(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError>;

    fn pull(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError>;
}

/// Compiled sync exclusions, rsync style: a pattern containing `/` matches the path
/// relative to the chest folder, any other pattern matches a file name at any depth.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    anchored: GlobSet,
    names: GlobSet,
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self, TransportError> {
        let mut anchored = GlobSetBuilder::new();
        let mut names = GlobSetBuilder::new();
        for pattern in patterns {
            let trimmed = pattern.trim_start_matches('/');
            let glob = Glob::new(trimmed).map_err(|e| TransportError::Exclude {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            if pattern.contains('/') {
                anchored.add(glob);
            } else {
                names.add(glob);
            }
        }
        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|e| TransportError::Exclude {
                pattern: patterns.join(", "),
                message: e.to_string(),
            })
        };
        Ok(Self {
            anchored: build(anchored)?,
            names: build(names)?,
        })
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.anchored.is_match(relative)
            || relative
                .file_name()
                .map(|name| self.names.is_match(Path::new(name)))
                .unwrap_or(false)
    }
}
