//! Configuration System
//!
//! The minecraft root (the folder holding `EnderChest/`) is the unit of
//! configuration. Its `EnderChest/enderchest.toml` is layered over an optional user
//! config file and environment overrides, then frozen into an
//! [`Inventory`](crate::inventory::Inventory) snapshot for the rest of the run.

use crate::logging::LoggingConfig;
use crate::place::ConflictPolicy;
use crate::sync::DEFAULT_DO_NOT_SYNC;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure (`enderchest.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChestConfig {
    #[serde(default)]
    pub properties: ChestProperties,

    /// Registered instances
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,

    /// Remote EnderChests, in sync order
    #[serde(default)]
    pub remotes: Vec<RemoteConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chest-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChestProperties {
    /// Display name for this EnderChest
    #[serde(default)]
    pub name: Option<String>,

    /// Maintain `allowed_symlinks.txt` for instances that need it
    #[serde(default = "default_true")]
    pub offer_to_update_symlink_allowlist: bool,

    /// What to do when a real file or folder is in a link's way
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Write relative link targets where possible
    #[serde(default = "default_true")]
    pub relative_links: bool,

    /// Sync exclusions, relative to the chest folder
    #[serde(default = "default_do_not_sync")]
    pub do_not_sync: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_do_not_sync() -> Vec<String> {
    DEFAULT_DO_NOT_SYNC.iter().map(|s| s.to_string()).collect()
}

impl Default for ChestProperties {
    fn default() -> Self {
        Self {
            name: None,
            offer_to_update_symlink_allowlist: default_true(),
            conflict_policy: ConflictPolicy::default(),
            relative_links: default_true(),
            do_not_sync: default_do_not_sync(),
        }
    }
}

/// One `[[instances]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,

    /// Absolute, `~`-prefixed, or relative to the minecraft root
    pub root: PathBuf,

    #[serde(default)]
    pub minecraft_version: String,

    #[serde(default = "default_loader")]
    pub loader: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub server: bool,
}

fn default_loader() -> String {
    "vanilla".to_string()
}

/// One `[[remotes]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub uri: String,

    #[serde(default)]
    pub alias: Option<String>,
}
