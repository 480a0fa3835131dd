//! Merge rules: defaults, override order, conflict handling.

use crate::sync::DEFAULT_DO_NOT_SYNC;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied. Later sources override
/// earlier ones key by key; lists are replaced whole, never concatenated.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    let do_not_sync: Vec<String> = DEFAULT_DO_NOT_SYNC.iter().map(|s| s.to_string()).collect();
    Config::builder()
        .set_default("properties.offer_to_update_symlink_allowlist", true)?
        .set_default("properties.conflict_policy", "prompt")?
        .set_default("properties.relative_links", true)?
        .set_default("properties.do_not_sync", do_not_sync)
}
