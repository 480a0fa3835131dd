//! Minecraft's `allowed_symlinks.txt`.
//!
//! Newer game versions refuse to follow symlinks that are not listed in this file.
//! EnderChest owns a single marked block inside it and rewrites only that block;
//! lines the user wrote above or below it are preserved verbatim. An entry the user
//! already lists outside the block is not repeated inside it.

use crate::error::{ChestError, LinkError};
use crate::resolve::LinkPlan;
use crate::tree::path::{canonicalize_path, is_within};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ALLOWLIST_FILE_NAME: &str = "allowed_symlinks.txt";

const BLOCK_START: &str = "# BEGIN EnderChest managed block";
const BLOCK_END: &str = "# END EnderChest managed block";

pub fn allowlist_path(instance_root: &Path) -> PathBuf {
    instance_root.join(ALLOWLIST_FILE_NAME)
}

/// Entries the game needs to follow the planned links: the chest itself, plus the
/// external targets of box entries that are themselves user-made symlinks.
pub fn allowlist_entries(chest_root: &Path, plan: &LinkPlan) -> Vec<String> {
    let mut entries = vec![chest_root.display().to_string()];
    for (_, entry) in plan.iter() {
        let is_link = fs::symlink_metadata(&entry.source)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            continue;
        }
        if let Ok(target) = canonicalize_path(&entry.source) {
            if !is_within(&target, chest_root) {
                let rendered = target.display().to_string();
                if !entries.contains(&rendered) {
                    entries.push(rendered);
                }
            }
        }
    }
    entries
}

struct AllowlistFile {
    before: Vec<String>,
    after: Vec<String>,
    has_block: bool,
}

fn read_allowlist(path: &Path) -> Result<(Option<String>, AllowlistFile), ChestError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((
                None,
                AllowlistFile {
                    before: Vec::new(),
                    after: Vec::new(),
                    has_block: false,
                },
            ))
        }
        Err(e) => return Err(LinkError::io(path, e).into()),
    };

    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut in_block = false;
    let mut has_block = false;
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed == BLOCK_START {
            in_block = true;
            has_block = true;
            continue;
        }
        if trimmed == BLOCK_END {
            in_block = false;
            continue;
        }
        if in_block {
            continue;
        }
        if has_block {
            after.push(line.to_string());
        } else {
            before.push(line.to_string());
        }
    }
    Ok((
        Some(contents),
        AllowlistFile {
            before,
            after,
            has_block,
        },
    ))
}

/// Bring the managed block of an instance's allow-list up to date.
///
/// Returns whether the file changed (or, in a dry run, would change).
pub fn sync_allowlist(
    instance_root: &Path,
    entries: &[String],
    dry_run: bool,
) -> Result<bool, ChestError> {
    let path = allowlist_path(instance_root);
    let (existing, file) = read_allowlist(&path)?;

    let user_lines: Vec<&str> = file
        .before
        .iter()
        .chain(file.after.iter())
        .map(|l| l.trim())
        .collect();
    let mut wanted: Vec<&str> = Vec::new();
    for entry in entries {
        if !user_lines.contains(&entry.as_str()) && !wanted.contains(&entry.as_str()) {
            wanted.push(entry);
        }
    }
    if wanted.is_empty() && !file.has_block {
        return Ok(false);
    }

    let mut lines: Vec<&str> = file.before.iter().map(String::as_str).collect();
    if !wanted.is_empty() {
        lines.push(BLOCK_START);
        lines.extend(wanted.iter().copied());
        lines.push(BLOCK_END);
    }
    lines.extend(file.after.iter().map(String::as_str));

    let mut contents = lines.join("\n");
    contents.push('\n');
    if existing.as_deref() == Some(contents.as_str()) {
        return Ok(false);
    }

    debug!(path = %path.display(), entries = wanted.len(), dry_run, "Updating symlink allow-list");
    if !dry_run {
        fs::write(&path, contents).map_err(|e| LinkError::io(&path, e))?;
    }
    Ok(true)
}
