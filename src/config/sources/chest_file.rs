//! Chest config file source: <minecraft root>/EnderChest/enderchest.toml

use crate::config::paths::ender_chest_config;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add the chest config file to the builder. The file must exist: a minecraft root
/// without one has no EnderChest.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    minecraft_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = ender_chest_config(minecraft_root);
    if !path.is_file() {
        return Err(ConfigError::Message(format!(
            "No EnderChest config found at {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}
