//! Breaker: turn chest-sourced symlinks in an instance back into real files.
//!
//! Symlinks whose final target lies inside the EnderChest are replaced by a copy of
//! that content. Symlinks that merely hop through the chest to somewhere else are
//! collapsed into a direct absolute link to the final target. Everything else is left
//! alone, so running the breaker twice is a no-op the second time.

use crate::error::{ChestError, LinkError};
use crate::instance::Instance;
use crate::tree::path::{
    canonicalize_path, create_symlink, is_within, link_destination, replace_with_symlink,
    staging_path,
};
use crate::tree::walker::collect_symlinks;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relinked {
    pub link: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakFailure {
    pub path: PathBuf,
    pub detail: String,
}

/// What breaking one instance did (or, in a dry run, would do).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakReport {
    pub instance: String,
    pub dry_run: bool,
    /// Links replaced by a copy of their chest content
    pub materialized: Vec<PathBuf>,
    /// Links re-pointed straight at an external target
    pub relinked: Vec<Relinked>,
    /// Links that could not be handled, including broken ones
    pub failed: Vec<BreakFailure>,
}

impl BreakReport {
    fn new(instance: &str, dry_run: bool) -> Self {
        Self {
            instance: instance.to_string(),
            dry_run,
            materialized: Vec::new(),
            relinked: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} materialized, {} relinked, {} failed",
            self.instance,
            self.materialized.len(),
            self.relinked.len(),
            self.failed.len()
        )
    }
}

/// Break every chest-sourced link inside `instance`.
pub fn break_instance(
    instance: &Instance,
    chest_root: &Path,
    dry_run: bool,
) -> Result<BreakReport, ChestError> {
    let chest = canonicalize_path(chest_root)?;
    let mut report = BreakReport::new(&instance.name, dry_run);

    if !instance.root.is_dir() {
        warn!(instance = %instance.name, root = %instance.root.display(), "Instance folder is missing");
        return Ok(report);
    }

    for link in collect_symlinks(&instance.root) {
        let final_target = match canonicalize_path(&link) {
            Ok(target) => target,
            Err(_) => {
                warn!(path = %link.display(), "Skipping broken symlink");
                report.failed.push(BreakFailure {
                    path: link,
                    detail: "broken symlink".to_string(),
                });
                continue;
            }
        };

        if is_within(&final_target, &chest) {
            debug!(path = %link.display(), source = %final_target.display(), "Materializing");
            let result = if dry_run {
                Ok(())
            } else {
                materialize(&link, &final_target, &chest)
            };
            match result {
                Ok(()) => report.materialized.push(link),
                Err(e) => report.failed.push(BreakFailure {
                    path: link,
                    detail: e.to_string(),
                }),
            }
        } else if hops_through_chest(&link, chest_root, &chest) {
            debug!(path = %link.display(), target = %final_target.display(), "Relinking");
            let result = if dry_run {
                Ok(())
            } else {
                replace_with_symlink(&final_target, &link, final_target.is_dir())
            };
            match result {
                Ok(()) => report.relinked.push(Relinked {
                    link,
                    target: final_target,
                }),
                Err(e) => report.failed.push(BreakFailure {
                    path: link,
                    detail: e.to_string(),
                }),
            }
        }
    }

    info!(
        instance = %instance.name,
        dry_run,
        materialized = report.materialized.len(),
        relinked = report.relinked.len(),
        failed = report.failed.len(),
        "Break finished"
    );
    Ok(report)
}

/// Whether the link's immediate target is inside the chest.
fn hops_through_chest(link: &Path, chest_root: &Path, chest: &Path) -> bool {
    let Ok(direct) = link_destination(link) else {
        return false;
    };
    if is_within(&direct, chest_root) || is_within(&direct, chest) {
        return true;
    }
    // The hop may be spelled through a symlinked parent directory.
    match (direct.parent(), direct.file_name()) {
        (Some(parent), Some(name)) => canonicalize_path(parent)
            .map(|p| is_within(&p.join(name), chest))
            .unwrap_or(false),
        _ => false,
    }
}

/// Replace the symlink at `link` with a copy of `source`. The copy is staged next to
/// the link first so the link is only removed once its replacement is complete.
fn materialize(link: &Path, source: &Path, chest: &Path) -> Result<(), LinkError> {
    let staged = staging_path(link);
    remove_any(&staged)?;

    if source.is_dir() {
        let mut visited = HashSet::new();
        visited.insert(source.to_path_buf());
        if let Err(e) = copy_dir(source, &staged, chest, &mut visited) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e);
        }
        remove_link(link)?;
    } else {
        fs::copy(source, &staged).map_err(|e| LinkError::io(source, e))?;
    }

    fs::rename(&staged, link).map_err(|e| LinkError::io(link, e))
}

/// Copy a directory tree out of the chest. Nested links into the chest are
/// materialized too; nested links elsewhere become absolute links to their final
/// target; broken ones are copied as-is.
fn copy_dir(
    source: &Path,
    destination: &Path,
    chest: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<(), LinkError> {
    fs::create_dir(destination).map_err(|e| LinkError::io(destination, e))?;

    let mut entries: Vec<_> = fs::read_dir(source)
        .map_err(|e| LinkError::io(source, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| LinkError::io(source, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| LinkError::io(&from, e))?;

        if file_type.is_symlink() {
            match canonicalize_path(&from) {
                Ok(target) if is_within(&target, chest) => {
                    copy_resolved(&target, &to, chest, visited)?;
                }
                Ok(target) => create_symlink(&target, &to, target.is_dir())?,
                Err(_) => {
                    warn!(path = %from.display(), "Copying broken symlink verbatim");
                    let raw = fs::read_link(&from).map_err(|e| LinkError::io(&from, e))?;
                    create_symlink(&raw, &to, false)?;
                }
            }
        } else if file_type.is_dir() {
            copy_resolved(&from, &to, chest, visited)?;
        } else {
            fs::copy(&from, &to).map_err(|e| LinkError::io(&from, e))?;
        }
    }
    Ok(())
}

fn copy_resolved(
    source: &Path,
    destination: &Path,
    chest: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<(), LinkError> {
    if source.is_dir() {
        let canonical = canonicalize_path(source)?;
        if !visited.insert(canonical.clone()) {
            return Err(LinkError::Cycle(canonical));
        }
        let result = copy_dir(source, destination, chest, visited);
        visited.remove(&canonical);
        result
    } else {
        fs::copy(source, destination)
            .map(|_| ())
            .map_err(|e| LinkError::io(source, e))
    }
}

fn remove_any(path: &Path) -> Result<(), LinkError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|e| LinkError::io(path, e)),
        Ok(_) => fs::remove_file(path).map_err(|e| LinkError::io(path, e)),
        Err(_) => Ok(()),
    }
}

#[cfg(unix)]
fn remove_link(link: &Path) -> Result<(), LinkError> {
    fs::remove_file(link).map_err(|e| LinkError::io(link, e))
}

#[cfg(windows)]
fn remove_link(link: &Path) -> Result<(), LinkError> {
    fs::remove_dir(link)
        .or_else(|_| fs::remove_file(link))
        .map_err(|e| LinkError::io(link, e))
}
