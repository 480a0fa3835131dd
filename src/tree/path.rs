//! Path canonicalization, normalization, and symlink helpers

use crate::error::LinkError;
use std::path::{Component, Path, PathBuf};

/// Canonicalize a path (resolves symlinks, `..`, `.`).
///
/// Uses dunce so Windows paths stay in their familiar form.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, LinkError> {
    dunce::canonicalize(path).map_err(|e| LinkError::io(path, e))
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the components
/// that do not exist yet. Falls back to lexical normalization when nothing resolves.
pub fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(canonical) = canonicalize_path(current) {
            let mut resolved = canonical;
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return resolved;
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return normalize_lexically(path),
        }
    }
}

/// `path` with its parent directory canonicalized and the final component kept as is,
/// so a symlink at `path` is not followed. `None` when the parent does not resolve.
pub fn canonicalize_parent(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = canonicalize_path(path.parent()?).ok()?;
    Some(parent.join(name))
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Make `path` absolute against `base` (when relative) and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    if let Some(Component::Normal(first)) = components.next() {
        if first == "~" {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(components.as_path());
            }
        }
    }
    path.to_path_buf()
}

/// Relative link target from the directory that will hold the link to `source`.
///
/// Returns `None` when no relative path exists (e.g. different drive prefixes).
pub fn relative_link_target(source: &Path, link_parent: &Path) -> Option<PathBuf> {
    let source = normalize_lexically(source);
    let link_parent = normalize_lexically(link_parent);
    if !source.is_absolute() || !link_parent.is_absolute() {
        return None;
    }

    let source_parts: Vec<Component> = source.components().collect();
    let parent_parts: Vec<Component> = link_parent.components().collect();

    // Different roots or prefixes mean no relative route.
    if source_parts.first() != parent_parts.first() {
        return None;
    }

    let common = source_parts
        .iter()
        .zip(parent_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..parent_parts.len() {
        relative.push("..");
    }
    for part in &source_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

/// Where a symlink points, made absolute against the link's own directory. Does not
/// follow further indirection.
pub fn link_destination(link: &Path) -> Result<PathBuf, LinkError> {
    let target = std::fs::read_link(link).map_err(|e| LinkError::io(link, e))?;
    let parent = link.parent().unwrap_or_else(|| Path::new("/"));
    Ok(absolutize(&target, parent))
}

/// Whether `path` lies at or below `root`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Create a symlink at `link` pointing at `target`.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path, _target_is_dir: bool) -> Result<(), LinkError> {
    std::os::unix::fs::symlink(target, link).map_err(|e| LinkError::io(link, e))
}

/// Create a symlink at `link` pointing at `target`.
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path, target_is_dir: bool) -> Result<(), LinkError> {
    let result = if target_is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| LinkError::io(link, e))
}

/// Sibling path used to stage a replacement before renaming it into place.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.enderchest-tmp", name))
}

/// Create (or replace) a symlink atomically: stage it under a sibling name and rename
/// it over `link`.
pub fn replace_with_symlink(
    target: &Path,
    link: &Path,
    target_is_dir: bool,
) -> Result<(), LinkError> {
    let staged = staging_path(link);
    if std::fs::symlink_metadata(&staged).is_ok() {
        std::fs::remove_file(&staged).map_err(|e| LinkError::io(&staged, e))?;
    }
    create_symlink(target, &staged, target_is_dir)?;
    if let Err(e) = std::fs::rename(&staged, link) {
        let _ = std::fs::remove_file(&staged);
        return Err(LinkError::io(link, e));
    }
    Ok(())
}
