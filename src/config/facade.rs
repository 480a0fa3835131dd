//! Config loading entry point.

use super::merge::merge_policy;
use super::paths;
use super::sources::{chest_file, environment, global_file};
use super::ChestConfig;
use crate::error::ChestError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads a [`ChestConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the config for the EnderChest under `minecraft_root`.
    ///
    /// Precedence, lowest first: built-in defaults, the user config file, the chest
    /// config file, `ENDERCHEST__*` environment variables.
    pub fn load(minecraft_root: &Path) -> Result<ChestConfig, ChestError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = chest_file::add_to_builder(builder, minecraft_root)?;
        let builder = environment::add_to_builder(builder);

        let config: ChestConfig = builder.build()?.try_deserialize()?;
        debug!(
            minecraft_root = %minecraft_root.display(),
            instances = config.instances.len(),
            remotes = config.remotes.len(),
            "Loaded EnderChest config"
        );
        Ok(config)
    }

    /// Load the config from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<ChestConfig, ChestError> {
        if !path.is_file() {
            return Err(ChestError::Config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        let builder = environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Path of the user-level config file, whether or not it exists.
    pub fn xdg_config_path() -> Option<PathBuf> {
        paths::global_config_path()
    }
}
