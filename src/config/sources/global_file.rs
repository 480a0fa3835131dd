//! Global config file source: $XDG_CONFIG_HOME/enderchest/config.toml or
//! ~/.config/enderchest/config.toml

use crate::config::paths::global_config_path;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use tracing::debug;

/// Add the user-level config file to the builder when it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.is_file() {
            let canonical = dunce::canonicalize(&path).unwrap_or_else(|_| path.clone());
            builder = builder.add_source(File::from(canonical).format(FileFormat::Toml).required(false));
        } else {
            debug!(config_path = %path.display(), "No user-level EnderChest config");
        }
    }
    Ok(builder)
}
