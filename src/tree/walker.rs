//! Filesystem walker that enumerates what a shulker box contributes.

use crate::error::LinkError;
use crate::shulker_box::{DoNotLink, ShulkerBox};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What a leaf is linked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    File,
    /// Linked as a whole directory, never recursed into
    Directory,
}

/// One linkable leaf of a box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Path relative to the box root, which is also its path relative to the instance root
    pub relative: PathBuf,
    /// Absolute path inside the box
    pub source: PathBuf,
    pub kind: LeafKind,
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Directories at this depth are linked whole. Top-level entries have depth 1.
    pub max_depth: usize,
    /// Folders always linked as a unit; their ancestors are always recursed
    pub link_folders: Vec<PathBuf>,
    pub do_not_link: DoNotLink,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: crate::shulker_box::DEFAULT_MAX_LINK_DEPTH,
            link_folders: Vec::new(),
            do_not_link: DoNotLink::default(),
        }
    }
}

/// Contribution walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker with the default configuration
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walker configured from a shulker box's link settings
    pub fn for_box(shulker_box: &ShulkerBox) -> Self {
        Self::with_config(
            shulker_box.root.clone(),
            WalkerConfig {
                max_depth: shulker_box.max_link_depth,
                link_folders: shulker_box.link_folders.clone(),
                do_not_link: shulker_box.do_not_link.clone(),
            },
        )
    }

    /// Walk the box and collect its leaves, sorted by relative path.
    ///
    /// Symlinks found inside the box are leaves (directory symlinks are never followed);
    /// broken ones are skipped. Real directories are tracked by canonical path so a
    /// bind-mount loop cannot recurse forever.
    pub fn walk(&self) -> Result<Vec<Contribution>, LinkError> {
        let mut leaves = Vec::new();
        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "Shulker box folder is missing");
            return Ok(leaves);
        }

        for folder in &self.config.link_folders {
            if std::fs::symlink_metadata(self.root.join(folder)).is_err() {
                warn!(
                    root = %self.root.display(),
                    folder = %folder.display(),
                    "Link folder does not exist in shulker box; skipping"
                );
            }
        }

        let hard_limit = self
            .config
            .link_folders
            .iter()
            .map(|f| f.components().count())
            .chain(std::iter::once(self.config.max_depth))
            .max()
            .unwrap_or(self.config.max_depth);

        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(dunce::canonicalize(&self.root).map_err(|e| LinkError::io(&self.root, e))?);

        let mut entries = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(hard_limit)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry.map_err(|e| LinkError::Walk {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| LinkError::InvalidPath(path.display().to_string()))?
                .to_path_buf();
            let file_type = entry.file_type();

            if self.config.do_not_link.is_excluded(&relative) {
                debug!(path = %relative.display(), "Skipping do-not-link entry");
                if file_type.is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }

            if file_type.is_symlink() {
                match std::fs::metadata(path) {
                    Ok(meta) => leaves.push(Contribution {
                        source: path.to_path_buf(),
                        relative,
                        kind: if meta.is_dir() {
                            LeafKind::Directory
                        } else {
                            LeafKind::File
                        },
                    }),
                    Err(_) => {
                        warn!(path = %path.display(), "Skipping broken symlink inside shulker box")
                    }
                }
                continue;
            }

            if file_type.is_dir() {
                if self.is_link_folder(&relative)
                    || (entry.depth() >= self.config.max_depth && !self.is_link_ancestor(&relative))
                {
                    leaves.push(Contribution {
                        source: path.to_path_buf(),
                        relative,
                        kind: LeafKind::Directory,
                    });
                    entries.skip_current_dir();
                    continue;
                }

                let canonical = dunce::canonicalize(path).map_err(|e| LinkError::io(path, e))?;
                if !visited.insert(canonical) {
                    warn!(path = %path.display(), "Directory already visited; not recursing");
                    entries.skip_current_dir();
                }
                continue;
            }

            if file_type.is_file() {
                leaves.push(Contribution {
                    source: path.to_path_buf(),
                    relative,
                    kind: LeafKind::File,
                });
            }
        }

        leaves.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(leaves)
    }

    fn is_link_folder(&self, relative: &Path) -> bool {
        self.config.link_folders.iter().any(|f| f == relative)
    }

    fn is_link_ancestor(&self, relative: &Path) -> bool {
        self.config
            .link_folders
            .iter()
            .any(|f| f != relative && f.starts_with(relative))
    }
}

/// All symlinks under `root`, without following any of them.
pub fn collect_symlinks(root: &Path) -> Vec<PathBuf> {
    let mut links = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_symlink() => links.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Could not read part of the folder"),
        }
    }
    links
}
