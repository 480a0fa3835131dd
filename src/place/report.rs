//! Placement report types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Result of placing one plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Created,
    Updated,
    AlreadyCorrect,
    Skipped,
    Failed,
}

impl Outcome {
    /// Whether a link exists at the path afterwards.
    pub fn is_linked(&self) -> bool {
        matches!(
            self,
            Outcome::Created | Outcome::Updated | Outcome::AlreadyCorrect
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::AlreadyCorrect => "already-correct",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Instance-relative path
    pub relative: PathBuf,
    pub source: PathBuf,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Why a link was removed before placing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupReason {
    /// Its target no longer exists
    Broken,
    /// It leads into the chest and sits where the plan now needs a real directory
    Stale,
}

impl fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CleanupReason::Broken => "broken",
            CleanupReason::Stale => "stale",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedLink {
    /// Instance-relative path
    pub relative: PathBuf,
    pub reason: CleanupReason,
}

/// Per-instance placement result. Dry runs produce the same entries a real run would.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    pub instance: String,
    pub dry_run: bool,
    /// Links removed by the cleanup pass, before any entry was placed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<RemovedLink>,
    pub entries: Vec<ReportEntry>,
    /// Set when the operator aborted at this path; later entries were not visited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<PathBuf>,
    pub allowlist_updated: bool,
}

impl PlacementReport {
    pub fn new(instance: impl Into<String>, dry_run: bool) -> Self {
        Self {
            instance: instance.into(),
            dry_run,
            removed: Vec::new(),
            entries: Vec::new(),
            aborted_at: None,
            allowlist_updated: false,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.outcome == Outcome::Failed)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} created, {} updated, {} already correct, {} skipped, {} failed",
            self.instance,
            self.count(Outcome::Created),
            self.count(Outcome::Updated),
            self.count(Outcome::AlreadyCorrect),
            self.count(Outcome::Skipped),
            self.count(Outcome::Failed),
        )
    }
}
