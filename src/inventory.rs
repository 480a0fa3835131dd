//! Inventory: the immutable snapshot of one EnderChest and the queries over it.
//!
//! Built once from a [`ChestConfig`] and the shulker boxes on disk, then passed by
//! reference to everything else. Nothing re-reads configuration afterwards.

use crate::config::paths::ender_chest_folder;
use crate::config::{ChestConfig, InstanceConfig};
use crate::error::ChestError;
use crate::instance::{Instance, Side};
use crate::matcher;
use crate::place::ConflictPolicy;
use crate::resolve::{resolve, LinkPlan};
use crate::shulker_box::load::load_shulker_boxes;
use crate::shulker_box::{MatchSection, ShulkerBox};
use crate::sync::Remote;
use crate::tree::path::{absolutize, canonicalize_path, expand_home};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Chest-wide behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub offer_to_update_symlink_allowlist: bool,
    pub conflict_policy: ConflictPolicy,
    pub relative_links: bool,
    pub do_not_sync: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Inventory {
    pub minecraft_root: PathBuf,
    pub chest_root: PathBuf,
    pub name: String,
    pub instances: Vec<Instance>,
    /// In processing order
    pub boxes: Vec<ShulkerBox>,
    /// In sync order
    pub remotes: Vec<Remote>,
    pub settings: Settings,
}

/// Serializable view of a shulker box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxSummary {
    pub name: String,
    pub priority: i64,
    pub root: PathBuf,
    pub max_link_depth: usize,
    pub link_folders: Vec<PathBuf>,
    #[serde(rename = "match")]
    pub match_section: MatchSection,
}

impl From<&ShulkerBox> for BoxSummary {
    fn from(shulker_box: &ShulkerBox) -> Self {
        Self {
            name: shulker_box.name.clone(),
            priority: shulker_box.priority,
            root: shulker_box.root.clone(),
            max_link_depth: shulker_box.max_link_depth,
            link_folders: shulker_box.link_folders.clone(),
            match_section: shulker_box.match_spec.to_section(),
        }
    }
}

impl Inventory {
    /// Freeze a loaded config into a validated snapshot.
    pub fn from_config(minecraft_root: &Path, config: &ChestConfig) -> Result<Self, ChestError> {
        let minecraft_root = canonicalize_path(minecraft_root).map_err(|e| {
            ChestError::Config(format!(
                "Minecraft root {} is not accessible: {}",
                minecraft_root.display(),
                e
            ))
        })?;
        let chest_root = ender_chest_folder(&minecraft_root);
        if !chest_root.is_dir() {
            return Err(ChestError::Config(format!(
                "There is no EnderChest at {}",
                chest_root.display()
            )));
        }

        let instances = config
            .instances
            .iter()
            .map(|c| instance_from_config(c, &minecraft_root))
            .collect::<Result<Vec<_>, _>>()?;
        validate_instances(&instances)?;

        let boxes = load_shulker_boxes(&chest_root)?;

        let remotes = config
            .remotes
            .iter()
            .map(|r| {
                Remote::parse(&r.uri, r.alias.as_deref())
                    .map_err(|e| ChestError::Config(format!("Invalid remote '{}': {}", r.uri, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = config.properties.name.clone().unwrap_or_else(|| {
            minecraft_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "EnderChest".to_string())
        });

        debug!(
            chest = %chest_root.display(),
            instances = instances.len(),
            boxes = boxes.len(),
            remotes = remotes.len(),
            "Built inventory"
        );
        Ok(Self {
            minecraft_root,
            chest_root,
            name,
            instances,
            boxes,
            remotes,
            settings: Settings {
                offer_to_update_symlink_allowlist: config
                    .properties
                    .offer_to_update_symlink_allowlist,
                conflict_policy: config.properties.conflict_policy,
                relative_links: config.properties.relative_links,
                do_not_sync: config.properties.do_not_sync.clone(),
            },
        })
    }

    pub fn instance(&self, name: &str) -> Result<&Instance, ChestError> {
        self.instances
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| ChestError::Config(format!("No instance named '{}'", name)))
    }

    pub fn shulker_box(&self, name: &str) -> Result<&ShulkerBox, ChestError> {
        self.boxes
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| ChestError::Config(format!("No shulker box named '{}'", name)))
    }

    /// Boxes that apply to an instance, in processing order.
    pub fn boxes_for_instance(&self, name: &str) -> Result<Vec<&ShulkerBox>, ChestError> {
        let instance = self.instance(name)?;
        Ok(matcher::matching_boxes(instance, &self.boxes))
    }

    /// Instances a box applies to, in config order.
    pub fn instances_for_box(&self, name: &str) -> Result<Vec<&Instance>, ChestError> {
        let shulker_box = self.shulker_box(name)?;
        Ok(self
            .instances
            .iter()
            .filter(|i| matcher::matches(i, shulker_box))
            .collect())
    }

    /// The resolved link plan for one instance.
    pub fn plan_for_instance(&self, name: &str) -> Result<LinkPlan, ChestError> {
        resolve(self.instance(name)?, &self.boxes)
    }

    pub fn box_summaries(&self) -> Vec<BoxSummary> {
        self.boxes.iter().map(BoxSummary::from).collect()
    }
}

fn instance_from_config(config: &InstanceConfig, minecraft_root: &Path) -> Result<Instance, ChestError> {
    if config.name.trim().is_empty() {
        return Err(ChestError::Config(format!(
            "Instance at {} has an empty name",
            config.root.display()
        )));
    }
    let root = absolutize(&expand_home(&config.root), minecraft_root);
    Ok(Instance::new(config.name.trim(), root)
        .with_tags(config.tags.iter().map(|t| t.trim().to_string()))
        .with_version(config.minecraft_version.trim())
        .with_loader(config.loader.trim())
        .with_side(Side::from_server_flag(config.server)))
}

/// Instance names and roots are both unique.
pub fn validate_instances(instances: &[Instance]) -> Result<(), ChestError> {
    let mut names: HashMap<&str, &Path> = HashMap::new();
    let mut roots: HashMap<&Path, &str> = HashMap::new();
    for instance in instances {
        if let Some(other) = names.insert(instance.name.as_str(), instance.root.as_path()) {
            return Err(ChestError::Config(format!(
                "Instance name '{}' is used for both {} and {}",
                instance.name,
                other.display(),
                instance.root.display()
            )));
        }
        if let Some(other) = roots.insert(instance.root.as_path(), instance.name.as_str()) {
            return Err(ChestError::Config(format!(
                "Instances '{}' and '{}' share the root {}",
                other,
                instance.name,
                instance.root.display()
            )));
        }
    }
    Ok(())
}
