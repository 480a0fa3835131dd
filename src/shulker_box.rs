//! Shulker boxes: named, priority-ordered source trees inside the EnderChest.

mod criteria;
pub mod load;

pub use criteria::{Category, Criterion, MatchSection, MatchSpecification, ValuePattern};

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::ChestError;

/// File name of a shulker box's own config file.
pub const SHULKER_BOX_CONFIG_NAME: &str = "shulkerbox.toml";

pub const DEFAULT_PRIORITY: i64 = 0;

/// Top-level folders are recursed; anything at depth 2 (a file, or a folder inside a
/// folder) is linked as a unit.
pub const DEFAULT_MAX_LINK_DEPTH: usize = 2;

pub const DEFAULT_DO_NOT_LINK: &[&str] = &[SHULKER_BOX_CONFIG_NAME, ".DS_Store"];

/// Compiled do-not-link patterns. A pattern hits when it matches either the
/// box-relative path or the bare file name.
#[derive(Debug, Clone)]
pub struct DoNotLink {
    patterns: Vec<String>,
    set: GlobSet,
}

impl DoNotLink {
    pub fn new<I, S>(patterns: I) -> Result<Self, ChestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ChestError::Config(format!("Invalid do-not-link pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| ChestError::Config(format!("Invalid do-not-link patterns: {}", e)))?;
        Ok(Self { patterns, set })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.set.is_match(relative) {
            return true;
        }
        relative
            .file_name()
            .map(|name| self.set.is_match(Path::new(name)))
            .unwrap_or(false)
    }
}

impl Default for DoNotLink {
    fn default() -> Self {
        // The defaults are literal file names; they always compile.
        Self::new(DEFAULT_DO_NOT_LINK.iter().copied()).unwrap_or_else(|_| Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        })
    }
}

/// A shulker box record. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ShulkerBox {
    pub name: String,
    /// Absolute path to the box folder
    pub root: PathBuf,
    /// Lower is applied earlier and is overridden by later boxes
    pub priority: i64,
    pub match_spec: MatchSpecification,
    /// Box-relative folders that are always linked as a single unit
    pub link_folders: Vec<PathBuf>,
    pub max_link_depth: usize,
    pub do_not_link: DoNotLink,
}

impl ShulkerBox {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            priority: DEFAULT_PRIORITY,
            match_spec: MatchSpecification::global(),
            link_folders: Vec::new(),
            max_link_depth: DEFAULT_MAX_LINK_DEPTH,
            do_not_link: DoNotLink::default(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_match_spec(mut self, match_spec: MatchSpecification) -> Self {
        self.match_spec = match_spec;
        self
    }

    pub fn with_link_folders<I, P>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.link_folders = folders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_link_depth(mut self, depth: usize) -> Self {
        self.max_link_depth = depth;
        self
    }

    pub fn with_do_not_link(mut self, do_not_link: DoNotLink) -> Self {
        self.do_not_link = do_not_link;
        self
    }

    /// Processing order: priority ascending, then name ascending.
    pub fn processing_order(a: &ShulkerBox, b: &ShulkerBox) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.name.cmp(&b.name))
    }
}

/// Sort boxes into processing order.
pub fn sort_for_processing(boxes: &mut [ShulkerBox]) {
    boxes.sort_by(ShulkerBox::processing_order);
}
