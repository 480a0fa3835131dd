//! Link plan: instance-relative path to the single winning source.

use crate::tree::walker::LeafKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The winning source for one instance-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub shulker_box: String,
    pub kind: LeafKind,
}

/// A contribution that lost to a later box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shadowed {
    pub relative: PathBuf,
    pub shulker_box: String,
    pub overridden_by: String,
}

/// Mapping from instance-relative path to winning source. Iterates in path order, so
/// parents always come before their children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkPlan {
    entries: BTreeMap<PathBuf, PlanEntry>,
    shadowed: Vec<Shadowed>,
}

impl LinkPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with "last write wins" semantics.
    ///
    /// Any existing entry at the same path is overwritten. Existing entries that are
    /// ancestors or descendants of `relative` are dropped as well, so the plan never
    /// places a link inside another planned link.
    pub fn insert(&mut self, relative: PathBuf, entry: PlanEntry) {
        let overlapping: Vec<PathBuf> = self
            .entries
            .range(relative.clone()..)
            .take_while(|(path, _)| path.starts_with(&relative))
            .map(|(path, _)| path.clone())
            .chain(
                relative
                    .ancestors()
                    .skip(1)
                    .filter(|a| !a.as_os_str().is_empty() && self.entries.contains_key(*a))
                    .map(Path::to_path_buf),
            )
            .collect();

        for path in overlapping {
            if let Some(old) = self.entries.remove(&path) {
                self.shadowed.push(Shadowed {
                    relative: path,
                    shulker_box: old.shulker_box,
                    overridden_by: entry.shulker_box.clone(),
                });
            }
        }

        self.entries.insert(relative, entry);
    }

    pub fn get(&self, relative: &Path) -> Option<&PlanEntry> {
        self.entries.get(relative)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PlanEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contributions that lost, in the order they were overridden.
    pub fn shadowed(&self) -> &[Shadowed] {
        &self.shadowed
    }
}
