//! Well-known locations: the chest folder, its config file, and the user config.

use std::path::{Path, PathBuf};

pub const ENDER_CHEST_FOLDER_NAME: &str = "EnderChest";
pub const ENDER_CHEST_CONFIG_NAME: &str = "enderchest.toml";

const GLOBAL_CONFIG_DIR: &str = "enderchest";
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// The EnderChest folder inside a minecraft root.
pub fn ender_chest_folder(minecraft_root: &Path) -> PathBuf {
    minecraft_root.join(ENDER_CHEST_FOLDER_NAME)
}

/// The chest config file inside a minecraft root.
pub fn ender_chest_config(minecraft_root: &Path) -> PathBuf {
    ender_chest_folder(minecraft_root).join(ENDER_CHEST_CONFIG_NAME)
}

/// `$XDG_CONFIG_HOME/enderchest/config.toml`, falling back to
/// `~/.config/enderchest/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(config_home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_NAME))
}
