//! Local-folder transport: mirror the chest into another folder on this machine.

use super::transport::{Change, ChangeKind, ExcludeSet, Transport};
use super::TransportError;
use crate::error::LinkError;
use crate::tree::path::create_symlink;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Transport for `file://` URIs and plain paths.
#[derive(Debug, Clone)]
pub struct FileTransport {
    /// The remote minecraft root
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn remote_chest(&self, chest: &Path) -> PathBuf {
        match chest.file_name() {
            Some(name) => self.root.join(name),
            None => self.root.clone(),
        }
    }
}

impl Transport for FileTransport {
    fn push(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError> {
        if !self.root.is_dir() {
            return Err(TransportError::Unreachable(self.root.display().to_string()));
        }
        mirror(chest, &self.remote_chest(chest), &ExcludeSet::new(excludes)?, dry_run)
    }

    fn pull(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError> {
        let remote = self.remote_chest(chest);
        if !remote.is_dir() {
            return Err(TransportError::Unreachable(remote.display().to_string()));
        }
        mirror(&remote, chest, &ExcludeSet::new(excludes)?, dry_run)
    }
}

/// Make `destination` an exact copy of `source`, apart from excluded entries.
/// Symlinks are recreated, never followed.
pub fn mirror(
    source: &Path,
    destination: &Path,
    excludes: &ExcludeSet,
    dry_run: bool,
) -> Result<Vec<Change>, TransportError> {
    let mut changes = Vec::new();
    if !dry_run {
        fs::create_dir_all(destination).map_err(|e| LinkError::io(destination, e))?;
    }

    let copy_pass = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !excluded(e.path(), source, excludes));
    for entry in copy_pass {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let from = entry.path();
        let relative = relative_to(from, source)?;
        let to = destination.join(&relative);
        let existing = fs::symlink_metadata(&to).ok();
        let file_type = entry.file_type();

        let kind = if file_type.is_dir() {
            match &existing {
                Some(meta) if meta.is_dir() => None,
                Some(_) => Some(ChangeKind::Update),
                None => Some(ChangeKind::Create),
            }
        } else if file_type.is_symlink() {
            let raw = fs::read_link(from).map_err(|e| LinkError::io(from, e))?;
            match &existing {
                Some(meta)
                    if meta.file_type().is_symlink()
                        && fs::read_link(&to).map(|t| t == raw).unwrap_or(false) =>
                {
                    None
                }
                Some(_) => Some(ChangeKind::Update),
                None => Some(ChangeKind::Create),
            }
        } else {
            let source_meta = entry.metadata().map_err(|e| walk_error(source, e))?;
            match &existing {
                Some(meta)
                    if meta.is_file()
                        && meta.len() == source_meta.len()
                        && meta.modified().ok() == source_meta.modified().ok() =>
                {
                    None
                }
                Some(_) => Some(ChangeKind::Update),
                None => Some(ChangeKind::Create),
            }
        };

        let Some(kind) = kind else {
            continue;
        };
        debug!(path = %relative.display(), ?kind, dry_run, "Mirroring entry");
        changes.push(Change::new(kind, relative));
        if !dry_run {
            if let Some(meta) = existing {
                remove_entry(&to, &meta)?;
            }
            copy_entry(from, &to, file_type)?;
        }
    }

    if destination.is_dir() {
        let delete_pass = WalkDir::new(destination)
            .min_depth(1)
            .follow_links(false)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !excluded(e.path(), destination, excludes));
        // Children come before their folder, so a folder is deleted only once every
        // child is (or would be) gone. Excluded children keep the folder alive.
        let mut deleted: HashSet<PathBuf> = HashSet::new();
        for entry in delete_pass {
            let entry = entry.map_err(|e| walk_error(destination, e))?;
            let relative = relative_to(entry.path(), destination)?;
            if fs::symlink_metadata(source.join(&relative)).is_ok() {
                continue;
            }
            let meta =
                fs::symlink_metadata(entry.path()).map_err(|e| LinkError::io(entry.path(), e))?;
            if meta.is_dir() {
                let children = fs::read_dir(entry.path()).map_err(|e| LinkError::io(entry.path(), e))?;
                let has_survivor = children
                    .filter_map(Result::ok)
                    .any(|child| !deleted.contains(&relative.join(child.file_name())));
                if has_survivor {
                    debug!(path = %relative.display(), "Keeping folder with excluded contents");
                    continue;
                }
            }
            debug!(path = %relative.display(), dry_run, "Deleting extraneous entry");
            if !dry_run {
                if meta.is_dir() {
                    fs::remove_dir(entry.path()).map_err(|e| LinkError::io(entry.path(), e))?;
                } else {
                    remove_entry(entry.path(), &meta)?;
                }
            }
            deleted.insert(relative.clone());
            changes.push(Change::new(ChangeKind::Delete, relative));
        }
    }

    Ok(changes)
}

fn excluded(path: &Path, root: &Path, excludes: &ExcludeSet) -> bool {
    path.strip_prefix(root)
        .map(|relative| !relative.as_os_str().is_empty() && excludes.is_excluded(relative))
        .unwrap_or(false)
}

fn relative_to(path: &Path, root: &Path) -> Result<PathBuf, TransportError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| LinkError::InvalidPath(path.display().to_string()).into())
}

fn walk_error(root: &Path, e: walkdir::Error) -> TransportError {
    LinkError::Walk {
        path: root.to_path_buf(),
        message: e.to_string(),
    }
    .into()
}

fn remove_entry(path: &Path, meta: &fs::Metadata) -> Result<(), TransportError> {
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| LinkError::io(path, e).into())
}

fn copy_entry(from: &Path, to: &Path, file_type: fs::FileType) -> Result<(), TransportError> {
    if file_type.is_dir() {
        fs::create_dir_all(to).map_err(|e| LinkError::io(to, e))?;
    } else if file_type.is_symlink() {
        let raw = fs::read_link(from).map_err(|e| LinkError::io(from, e))?;
        create_symlink(&raw, to, from.is_dir())?;
    } else {
        fs::copy(from, to).map_err(|e| LinkError::io(from, e))?;
        // Keep mtimes aligned so unchanged files are recognized next time.
        let modified = fs::metadata(from)
            .and_then(|m| m.modified())
            .map_err(|e| LinkError::io(from, e))?;
        fs::File::options()
            .write(true)
            .open(to)
            .and_then(|f| f.set_modified(modified))
            .map_err(|e| LinkError::io(to, e))?;
    }
    Ok(())
}
