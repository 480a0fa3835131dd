//! Layered config loading and validation.

use super::test_utils::{with_xdg_env, ChestFixture};
use enderchest::config::ConfigLoader;
use enderchest::error::ChestError;
use enderchest::inventory::Inventory;
use enderchest::place::ConflictPolicy;
use std::fs;

#[test]
fn test_defaults_apply_without_properties() {
    let mut chest = ChestFixture::new();
    chest.instance("a", "1.20.1", "fabric", &[], false);
    let inventory = chest.inventory();
    assert_eq!(inventory.name, "mc");
    assert!(inventory.settings.relative_links);
    assert!(inventory.settings.offer_to_update_symlink_allowlist);
    assert_eq!(inventory.settings.conflict_policy, ConflictPolicy::Prompt);
    assert!(inventory
        .settings
        .do_not_sync
        .contains(&"enderchest.toml".to_string()));
}

#[test]
fn test_chest_file_wins_over_global_file() {
    let mut chest = ChestFixture::new();
    chest.properties("name = \"Main\"\nconflict_policy = \"skip\"");
    let global = chest.temp.path().join("xdg/enderchest");
    fs::create_dir_all(&global).unwrap();
    fs::write(
        global.join("config.toml"),
        "[properties]\nconflict_policy = \"overwrite\"\nrelative_links = false\n",
    )
    .unwrap();

    let config = with_xdg_env(&chest.temp, || ConfigLoader::load(&chest.root)).unwrap();
    assert_eq!(config.properties.name.as_deref(), Some("Main"));
    assert_eq!(config.properties.conflict_policy, ConflictPolicy::Skip);
    assert!(!config.properties.relative_links);
}

#[test]
fn test_environment_overrides_files() {
    let mut chest = ChestFixture::new();
    chest.properties("relative_links = true");
    let config = with_xdg_env(&chest.temp, || {
        std::env::set_var("ENDERCHEST__PROPERTIES__RELATIVE_LINKS", "false");
        let config = ConfigLoader::load(&chest.root);
        std::env::remove_var("ENDERCHEST__PROPERTIES__RELATIVE_LINKS");
        config
    })
    .unwrap();
    assert!(!config.properties.relative_links);
}

#[test]
fn test_missing_chest_file_is_a_config_error() {
    let chest = ChestFixture::new();
    fs::remove_file(chest.chest().join("enderchest.toml")).unwrap();
    let result = with_xdg_env(&chest.temp, || ConfigLoader::load(&chest.root));
    assert!(matches!(result, Err(ChestError::Config(_))));
}

#[test]
fn test_load_from_explicit_file() {
    let chest = ChestFixture::new();
    let path = chest.temp.path().join("other.toml");
    fs::write(
        &path,
        "[properties]\nname = \"Explicit\"\n\n[[remotes]]\nuri = \"deck@steamdeck:minecraft\"\n",
    )
    .unwrap();
    let config = with_xdg_env(&chest.temp, || ConfigLoader::load_from_file(&path)).unwrap();
    assert_eq!(config.properties.name.as_deref(), Some("Explicit"));
    assert_eq!(config.remotes.len(), 1);

    let inventory = Inventory::from_config(&chest.root, &config).unwrap();
    assert_eq!(inventory.remotes[0].alias, "steamdeck");
}

#[test]
fn test_invalid_shulker_boxes_are_fatal() {
    let cases = [
        "[properties]\nmax_link_depth = 0\n",
        "[match]\ntags = [\"!\"]\n",
        "[match]\nserver = [\"sometimes\"]\n",
        "[match]\nminecraft = [\"1.20[\"]\n",
        "[properties]\npriority = \"high\"\n",
    ];
    for config in cases {
        let mut chest = ChestFixture::new();
        chest.instance("a", "1.20.1", "fabric", &[], false);
        chest.shulker_box("Broken", config);
        let loaded = with_xdg_env(&chest.temp, || ConfigLoader::load(&chest.root)).unwrap();
        assert!(
            matches!(
                Inventory::from_config(&chest.root, &loaded),
                Err(ChestError::Config(_))
            ),
            "expected a config error for {:?}",
            config
        );
    }
}

#[test]
fn test_duplicate_box_names_are_fatal() {
    let chest = ChestFixture::new();
    chest.shulker_box("one", "[properties]\nname = \"same\"\n");
    chest.shulker_box("two", "[properties]\nname = \"same\"\n");
    let loaded = with_xdg_env(&chest.temp, || ConfigLoader::load(&chest.root)).unwrap();
    assert!(matches!(
        Inventory::from_config(&chest.root, &loaded),
        Err(ChestError::Config(_))
    ));
}
