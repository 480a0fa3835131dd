//! Conflict handling for obstructions found during placement.

use crate::error::ChestError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What currently occupies a planned link location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingState {
    File { size: u64 },
    Directory { entries: usize },
}

impl fmt::Display for ExistingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExistingState::File { size } => write!(f, "existing file ({} bytes)", size),
            ExistingState::Directory { entries } => {
                write!(f, "existing directory ({} entries)", entries)
            }
        }
    }
}

/// Response to a single conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Overwrite,
    Skip,
    Abort,
}

/// Configured default for conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    #[default]
    Prompt,
    Skip,
    Fail,
    Overwrite,
}

impl FromStr for ConflictPolicy {
    type Err = ChestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prompt" => Ok(ConflictPolicy::Prompt),
            "skip" => Ok(ConflictPolicy::Skip),
            "fail" | "abort" => Ok(ConflictPolicy::Fail),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            other => Err(ChestError::Config(format!(
                "Unknown conflict policy '{}' (expected prompt, skip, fail or overwrite)",
                other
            ))),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictPolicy::Prompt => "prompt",
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Fail => "fail",
            ConflictPolicy::Overwrite => "overwrite",
        };
        f.write_str(s)
    }
}

/// Decision source consulted whenever a real file or non-empty directory blocks a link.
pub trait ConflictResolver {
    fn resolve_conflict(
        &mut self,
        path: &Path,
        existing: &ExistingState,
    ) -> Result<Decision, ChestError>;
}

/// Applies a fixed, non-interactive policy.
///
/// `Prompt` has nobody to ask here and falls back to `Skip`.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver {
    policy: ConflictPolicy,
}

impl PolicyResolver {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }
}

impl ConflictResolver for PolicyResolver {
    fn resolve_conflict(
        &mut self,
        _path: &Path,
        _existing: &ExistingState,
    ) -> Result<Decision, ChestError> {
        Ok(match self.policy {
            ConflictPolicy::Prompt | ConflictPolicy::Skip => Decision::Skip,
            ConflictPolicy::Fail => Decision::Abort,
            ConflictPolicy::Overwrite => Decision::Overwrite,
        })
    }
}

/// Replays a fixed list of decisions, then a fallback. Records every path it was asked
/// about, in order.
#[derive(Debug, Clone)]
pub struct ScriptedResolver {
    decisions: VecDeque<Decision>,
    fallback: Decision,
    asked: Vec<PathBuf>,
}

impl ScriptedResolver {
    pub fn new<I: IntoIterator<Item = Decision>>(decisions: I) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            fallback: Decision::Skip,
            asked: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: Decision) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn asked(&self) -> &[PathBuf] {
        &self.asked
    }
}

impl ConflictResolver for ScriptedResolver {
    fn resolve_conflict(
        &mut self,
        path: &Path,
        _existing: &ExistingState,
    ) -> Result<Decision, ChestError> {
        self.asked.push(path.to_path_buf());
        Ok(self.decisions.pop_front().unwrap_or(self.fallback))
    }
}
