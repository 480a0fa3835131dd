//! Shulker box discovery: every `EnderChest/<folder>/shulkerbox.toml`.

use super::{
    sort_for_processing, DoNotLink, MatchSection, MatchSpecification, ShulkerBox,
    DEFAULT_DO_NOT_LINK, DEFAULT_MAX_LINK_DEPTH, DEFAULT_PRIORITY, SHULKER_BOX_CONFIG_NAME,
};
use crate::error::{ChestError, LinkError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// A shulker box config file, as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShulkerBoxFile {
    #[serde(default)]
    pub properties: BoxProperties,

    #[serde(default, rename = "match")]
    pub match_section: MatchSection,

    #[serde(default, alias = "link-folders")]
    pub link_folders: Vec<String>,

    #[serde(default = "default_do_not_link", alias = "do-not-link")]
    pub do_not_link: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxProperties {
    /// Overrides the folder name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(default = "default_max_link_depth", alias = "max-link-depth")]
    pub max_link_depth: usize,
}

impl Default for BoxProperties {
    fn default() -> Self {
        Self {
            name: None,
            priority: default_priority(),
            max_link_depth: default_max_link_depth(),
        }
    }
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

fn default_max_link_depth() -> usize {
    DEFAULT_MAX_LINK_DEPTH
}

fn default_do_not_link() -> Vec<String> {
    DEFAULT_DO_NOT_LINK.iter().map(|s| s.to_string()).collect()
}

impl ShulkerBoxFile {
    /// Convert to a validated record rooted at `root`.
    pub fn into_shulker_box(self, root: &Path) -> Result<ShulkerBox, ChestError> {
        let name = match self.properties.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => {
                return Err(ChestError::Config(format!(
                    "{}: shulker box name cannot be empty",
                    root.display()
                )))
            }
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    ChestError::Config(format!("{} has no folder name", root.display()))
                })?,
        };

        if self.properties.max_link_depth == 0 {
            return Err(ChestError::Config(format!(
                "Shulker box '{}': max_link_depth must be at least 1",
                name
            )));
        }

        let match_spec = MatchSpecification::parse(&self.match_section)
            .map_err(|e| ChestError::Config(format!("Shulker box '{}': {}", name, e)))?;

        let mut link_folders = Vec::with_capacity(self.link_folders.len());
        for folder in &self.link_folders {
            link_folders.push(validate_relative(&name, folder)?);
        }

        let do_not_link = DoNotLink::new(self.do_not_link)
            .map_err(|e| ChestError::Config(format!("Shulker box '{}': {}", name, e)))?;

        Ok(ShulkerBox {
            name,
            root: root.to_path_buf(),
            priority: self.properties.priority,
            match_spec,
            link_folders,
            max_link_depth: self.properties.max_link_depth,
            do_not_link,
        })
    }
}

fn validate_relative(box_name: &str, folder: &str) -> Result<PathBuf, ChestError> {
    let path = PathBuf::from(folder.trim().trim_end_matches('/'));
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.as_os_str().is_empty() || escapes {
        return Err(ChestError::Config(format!(
            "Shulker box '{}': link folder '{}' must be a relative path inside the box",
            box_name, folder
        )));
    }
    Ok(path)
}

/// Paths to every shulker box config in the chest, sorted by folder name.
pub fn shulker_box_configs(chest_root: &Path) -> Result<Vec<PathBuf>, ChestError> {
    let mut configs = Vec::new();
    let entries = fs::read_dir(chest_root).map_err(|e| LinkError::io(chest_root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| LinkError::io(chest_root, e))?;
        let candidate = entry.path().join(SHULKER_BOX_CONFIG_NAME);
        if candidate.is_file() {
            debug!(config = %candidate.display(), "Found shulker box config");
            configs.push(candidate);
        }
    }
    configs.sort();
    Ok(configs)
}

/// Parse one shulker box from its config file.
pub fn load_shulker_box(config_file: &Path) -> Result<ShulkerBox, ChestError> {
    let root = config_file.parent().ok_or_else(|| {
        ChestError::Config(format!("{} has no parent folder", config_file.display()))
    })?;
    let contents = fs::read_to_string(config_file).map_err(|e| LinkError::io(config_file, e))?;
    let file: ShulkerBoxFile = toml::from_str(&contents).map_err(|e| {
        ChestError::Config(format!("{} is not a valid shulker box config: {}", config_file.display(), e))
    })?;
    file.into_shulker_box(root)
}

/// Load every shulker box in the chest, validated and in processing order.
pub fn load_shulker_boxes(chest_root: &Path) -> Result<Vec<ShulkerBox>, ChestError> {
    let mut boxes = Vec::new();
    for config in shulker_box_configs(chest_root)? {
        boxes.push(load_shulker_box(&config)?);
    }
    validate_unique(&boxes)?;
    sort_for_processing(&mut boxes);

    if boxes.is_empty() {
        info!(chest = %chest_root.display(), "There are no shulker boxes in this EnderChest");
    } else {
        for (position, shulker_box) in boxes.iter().enumerate() {
            debug!(
                position,
                name = %shulker_box.name,
                priority = shulker_box.priority,
                "Shulker box in processing order"
            );
        }
    }
    Ok(boxes)
}

/// Box names must be unique, which also makes (priority, name) a total order.
pub fn validate_unique(boxes: &[ShulkerBox]) -> Result<(), ChestError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for shulker_box in boxes {
        if let Some(existing) = seen.insert(shulker_box.name.as_str(), shulker_box.root.as_path()) {
            return Err(ChestError::Config(format!(
                "Shulker box name '{}' is used by both {} and {}",
                shulker_box.name,
                existing.display(),
                shulker_box.root.display()
            )));
        }
    }
    Ok(())
}
