//! Placement engine: realize a link plan as symlinks inside an instance.
//!
//! Every entry is inspected against the live filesystem and ends up in exactly one
//! [`Outcome`]. Link creation and replacement go through a staged sibling and a
//! rename, so a running game never sees a half-written link. Dry runs walk the same
//! decision path without mutating anything and produce the same report.

pub mod allowlist;
mod conflict;
mod report;

pub use conflict::{
    ConflictPolicy, ConflictResolver, Decision, ExistingState, PolicyResolver, ScriptedResolver,
};
pub use report::{CleanupReason, Outcome, PlacementReport, RemovedLink, ReportEntry};

use crate::error::{ChestError, LinkError};
use crate::instance::{needs_symlink_allowlist, Instance};
use crate::resolve::{LinkPlan, PlanEntry};
use crate::tree::path::{
    canonicalize_existing_prefix, canonicalize_parent, canonicalize_path, create_symlink,
    is_within, relative_link_target, replace_with_symlink,
};
use crate::tree::walker::{collect_symlinks, LeafKind};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Placement switches.
#[derive(Debug, Clone, Copy)]
pub struct PlaceOptions {
    pub dry_run: bool,
    /// Prefer relative link targets; absolute targets are used when this is off or
    /// when no relative route exists
    pub relative: bool,
    /// Maintain `allowed_symlinks.txt` for game versions that need it
    pub allowlist: bool,
    /// Remove broken links, and chest links standing where the plan needs a directory,
    /// before placing
    pub cleanup: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            relative: true,
            allowlist: true,
            cleanup: true,
        }
    }
}

/// Outcome of a single entry before it is written into the report.
enum Step {
    Done(Outcome, Option<String>),
    Abort,
}

/// Applies link plans for one EnderChest.
pub struct Placer<'r> {
    chest_root: PathBuf,
    options: PlaceOptions,
    resolver: &'r mut dyn ConflictResolver,
    /// Links the cleanup pass removed (or would remove, on a dry run) for the current
    /// instance
    removed: HashSet<PathBuf>,
}

impl<'r> Placer<'r> {
    pub fn new(
        chest_root: &Path,
        options: PlaceOptions,
        resolver: &'r mut dyn ConflictResolver,
    ) -> Result<Self, ChestError> {
        Ok(Self {
            chest_root: canonicalize_path(chest_root)?,
            options,
            resolver,
            removed: HashSet::new(),
        })
    }

    /// Apply `plan` to `instance`.
    ///
    /// Filesystem failures are reported per entry and never stop the run. An `Abort`
    /// decision stops at that entry and leaves already-applied links in place.
    pub fn place(
        &mut self,
        instance: &Instance,
        plan: &LinkPlan,
    ) -> Result<PlacementReport, ChestError> {
        let mut report = PlacementReport::new(&instance.name, self.options.dry_run);
        self.removed.clear();
        if self.options.cleanup {
            self.cleanup(instance, plan, &mut report);
        }

        for (relative, entry) in plan.iter() {
            let link = instance.root.join(relative);
            let step = self.place_entry(&instance.root, &link, entry)?;
            let (outcome, detail) = match step {
                Step::Done(outcome, detail) => (outcome, detail),
                Step::Abort => {
                    warn!(path = %link.display(), "Placement aborted by operator");
                    report.entries.push(ReportEntry {
                        relative: relative.clone(),
                        source: entry.source.clone(),
                        outcome: Outcome::Failed,
                        detail: Some("aborted".to_string()),
                    });
                    report.aborted_at = Some(link);
                    break;
                }
            };

            match outcome {
                Outcome::Failed => warn!(
                    path = %link.display(),
                    detail = detail.as_deref().unwrap_or(""),
                    "Could not place link"
                ),
                Outcome::Skipped => debug!(path = %link.display(), "Skipped conflicting entry"),
                _ => debug!(path = %link.display(), outcome = %outcome, "Placed link"),
            }
            report.entries.push(ReportEntry {
                relative: relative.clone(),
                source: entry.source.clone(),
                outcome,
                detail,
            });
        }

        if !report.is_aborted()
            && self.options.allowlist
            && needs_symlink_allowlist(&instance.minecraft_version)
            && report.entries.iter().any(|e| e.outcome.is_linked())
        {
            let entries = allowlist::allowlist_entries(&self.chest_root, plan);
            match allowlist::sync_allowlist(&instance.root, &entries, self.options.dry_run) {
                Ok(changed) => report.allowlist_updated = changed,
                Err(e) => warn!(instance = %instance.name, error = %e, "Could not update symlink allow-list"),
            }
        }

        info!(
            instance = %instance.name,
            dry_run = self.options.dry_run,
            created = report.count(Outcome::Created),
            updated = report.count(Outcome::Updated),
            already_correct = report.count(Outcome::AlreadyCorrect),
            skipped = report.count(Outcome::Skipped),
            failed = report.count(Outcome::Failed),
            removed = report.removed.len(),
            "Placement finished"
        );
        Ok(report)
    }

    /// Remove links that would otherwise never converge: links whose target is gone,
    /// and links into the chest that sit above a planned entry (left over from a
    /// shallower link depth).
    fn cleanup(&mut self, instance: &Instance, plan: &LinkPlan, report: &mut PlacementReport) {
        if !instance.root.is_dir() {
            return;
        }
        for link in collect_symlinks(&instance.root) {
            let Ok(relative) = link.strip_prefix(&instance.root).map(Path::to_path_buf) else {
                continue;
            };
            let reason = match canonicalize_path(&link) {
                Err(_) => CleanupReason::Broken,
                Ok(target)
                    if is_within(&target, &self.chest_root)
                        && plan
                            .iter()
                            .any(|(planned, _)| planned != &relative && planned.starts_with(&relative)) =>
                {
                    CleanupReason::Stale
                }
                Ok(_) => continue,
            };
            if !self.options.dry_run {
                if let Err(e) = fs::remove_file(&link) {
                    warn!(path = %link.display(), error = %e, "Could not remove link");
                    continue;
                }
            }
            debug!(path = %link.display(), reason = %reason, "Removed link");
            self.removed.insert(link);
            report.removed.push(RemovedLink { relative, reason });
        }
    }

    /// `symlink_metadata` that treats links removed by the cleanup pass as absent, so
    /// a dry run sees what a real run would.
    fn existing_metadata(&self, path: &Path) -> std::io::Result<fs::Metadata> {
        if self.removed.contains(path) {
            return Err(std::io::Error::from(ErrorKind::NotFound));
        }
        fs::symlink_metadata(path)
    }

    fn place_entry(
        &mut self,
        instance_root: &Path,
        link: &Path,
        entry: &PlanEntry,
    ) -> Result<Step, ChestError> {
        let Some(parent) = link.parent() else {
            return Ok(failed(format!("{} has no parent directory", link.display())));
        };
        if let Err(detail) = self.check_parent(instance_root, parent) {
            return Ok(failed(detail));
        }
        let target = self.link_target(&entry.source, parent);
        let is_dir = entry.kind == LeafKind::Directory;

        let meta = match self.existing_metadata(link) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(self.create(parent, &target, link, is_dir, Outcome::Created, None));
            }
            Err(e) => return Ok(failed(LinkError::io(link, e).to_string())),
        };

        if meta.file_type().is_symlink() {
            if points_at(link, &entry.source) {
                return Ok(Step::Done(Outcome::AlreadyCorrect, None));
            }
            if self.options.dry_run {
                return Ok(Step::Done(Outcome::Updated, None));
            }
            return Ok(match replace_with_symlink(&target, link, is_dir) {
                Ok(()) => Step::Done(Outcome::Updated, None),
                Err(e) => failed(e.to_string()),
            });
        }

        let existing = if meta.is_dir() {
            let entries = match fs::read_dir(link) {
                Ok(iter) => iter.count(),
                Err(e) => return Ok(failed(LinkError::io(link, e).to_string())),
            };
            if entries == 0 {
                if !self.options.dry_run {
                    if let Err(e) = fs::remove_dir(link) {
                        return Ok(failed(LinkError::io(link, e).to_string()));
                    }
                }
                return Ok(self.create(parent, &target, link, is_dir, Outcome::Created, None));
            }
            ExistingState::Directory { entries }
        } else {
            ExistingState::File { size: meta.len() }
        };

        match self.resolver.resolve_conflict(link, &existing)? {
            Decision::Skip => Ok(Step::Done(
                Outcome::Skipped,
                Some(format!("kept {}", existing)),
            )),
            Decision::Abort => Ok(Step::Abort),
            Decision::Overwrite => {
                if !self.options.dry_run {
                    let removed = match &existing {
                        ExistingState::Directory { .. } => fs::remove_dir_all(link),
                        ExistingState::File { .. } => fs::remove_file(link),
                    };
                    if let Err(e) = removed {
                        return Ok(failed(LinkError::io(link, e).to_string()));
                    }
                }
                Ok(self.create(
                    parent,
                    &target,
                    link,
                    is_dir,
                    Outcome::Updated,
                    Some(format!("replaced {}", existing)),
                ))
            }
        }
    }

    fn create(
        &self,
        parent: &Path,
        target: &Path,
        link: &Path,
        is_dir: bool,
        outcome: Outcome,
        detail: Option<String>,
    ) -> Step {
        if self.options.dry_run {
            return Step::Done(outcome, detail);
        }
        if let Err(e) = fs::create_dir_all(parent) {
            return failed(LinkError::io(parent, e).to_string());
        }
        match create_symlink(target, link, is_dir) {
            Ok(()) => Step::Done(outcome, detail),
            Err(e) => failed(e.to_string()),
        }
    }

    /// The link's directory must be buildable and must not resolve into the chest,
    /// otherwise the link would be written into box content.
    fn check_parent(&self, instance_root: &Path, parent: &Path) -> Result<(), String> {
        let existing = parent
            .ancestors()
            .find(|p| self.existing_metadata(p).is_ok())
            .unwrap_or(instance_root);

        if let Ok(canonical) = canonicalize_path(existing) {
            if is_within(&canonical, &self.chest_root) {
                return Err(format!(
                    "{} resolves inside the EnderChest ({})",
                    existing.display(),
                    canonical.display()
                ));
            }
        }
        if existing != parent && !existing.is_dir() {
            return Err(format!("{} is not a directory", existing.display()));
        }
        if existing == parent && !parent.is_dir() {
            return Err(format!("{} is not a directory", parent.display()));
        }
        Ok(())
    }

    /// The relative form is computed between real locations, because the kernel
    /// resolves `..` against the directory the link actually lives in.
    fn link_target(&self, source: &Path, parent: &Path) -> PathBuf {
        if self.options.relative {
            let real_parent = canonicalize_existing_prefix(parent);
            let real_source = canonicalize_parent(source).unwrap_or_else(|| source.to_path_buf());
            if let Some(relative) = relative_link_target(&real_source, &real_parent) {
                return relative;
            }
        }
        source.to_path_buf()
    }
}

fn failed(detail: String) -> Step {
    Step::Done(Outcome::Failed, Some(detail))
}

/// Whether the symlink at `link` really leads to `source`.
///
/// The stored target is resolved the way the kernel does it, from the link's real
/// directory, so a target that only matches as text does not count.
fn points_at(link: &Path, source: &Path) -> bool {
    let (Ok(target), Some(parent)) = (fs::read_link(link), link.parent()) else {
        return false;
    };
    let destination = parent.join(target);
    if let (Some(a), Some(b)) = (canonicalize_parent(&destination), canonicalize_parent(source)) {
        if a == b {
            return true;
        }
    }
    match (canonicalize_path(link), canonicalize_path(source)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Apply `plan` to `instance` using the given chest root, options and conflict source.
pub fn place(
    instance: &Instance,
    plan: &LinkPlan,
    chest_root: &Path,
    options: PlaceOptions,
    resolver: &mut dyn ConflictResolver,
) -> Result<PlacementReport, ChestError> {
    Placer::new(chest_root, options, resolver)?.place(instance, plan)
}
