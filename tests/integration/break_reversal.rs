//! Breaking undoes placement without touching the chest.
#![cfg(unix)]

use super::test_utils::{is_symlink, link_target, ChestFixture};
use enderchest::orchestrate::{break_all, place_all, PlaceRequest};
use enderchest::place::{ConflictPolicy, PolicyResolver};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn placed_chest() -> ChestFixture {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "");
    chest.put("Global/options.txt", "options");
    chest.put("Global/mods/sodium.jar", "sodium");
    chest.put("Global/config/sodium/options.json", "{\"a\": 1}");
    chest.put("Global/config/sodium/nested/deep.json", "deep");
    chest.instance("bee", "1.20.1", "fabric", &[], false);

    let inventory = chest.inventory();
    place_all(
        &inventory,
        &PlaceRequest::default(),
        &mut PolicyResolver::new(ConflictPolicy::Skip),
    )
    .unwrap();
    chest
}

fn links_into(root: &Path, chest: &Path) -> Vec<String> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_symlink())
        .filter(|e| {
            dunce::canonicalize(e.path())
                .map(|t| t.starts_with(chest))
                .unwrap_or(false)
        })
        .map(|e| e.path().display().to_string())
        .collect()
}

#[test]
fn test_break_materializes_byte_identical_copies() {
    let chest = placed_chest();
    let root = chest.instance_root("bee");
    assert!(!links_into(&root, &chest.chest()).is_empty());

    let reports = break_all(&chest.inventory(), false).unwrap();
    assert_eq!(reports[0].materialized.len(), 3);
    assert!(reports[0].failed.is_empty());
    assert!(links_into(&root, &chest.chest()).is_empty());

    assert_eq!(fs::read(root.join("options.txt")).unwrap(), b"options");
    assert_eq!(fs::read(root.join("mods/sodium.jar")).unwrap(), b"sodium");
    assert_eq!(
        fs::read_to_string(root.join("config/sodium/nested/deep.json")).unwrap(),
        "deep"
    );
    assert!(!is_symlink(&root.join("config/sodium")));

    // The chest keeps its content.
    assert!(chest.chest().join("Global/config/sodium/options.json").is_file());
    assert!(chest.chest().join("Global/options.txt").is_file());
}

#[test]
fn test_break_is_idempotent() {
    let chest = placed_chest();
    let inventory = chest.inventory();
    break_all(&inventory, false).unwrap();
    let second = break_all(&inventory, false).unwrap();
    assert!(second[0].materialized.is_empty());
    assert!(second[0].relinked.is_empty());
    assert!(second[0].failed.is_empty());
}

#[test]
fn test_break_dry_run_changes_nothing() {
    let chest = placed_chest();
    let root = chest.instance_root("bee");
    let reports = break_all(&chest.inventory(), true).unwrap();
    assert_eq!(reports[0].materialized.len(), 3);
    assert!(reports[0].dry_run);
    assert!(is_symlink(&root.join("options.txt")));
    assert!(is_symlink(&root.join("config/sodium")));
}

#[test]
fn test_external_link_is_collapsed_to_its_target() {
    let mut chest = ChestFixture::new();
    let external = chest.temp.path().join("shared-saves");
    fs::create_dir_all(&external).unwrap();
    fs::write(external.join("level.dat"), "world").unwrap();
    let external = dunce::canonicalize(&external).unwrap();

    let global = chest.shulker_box("Global", "");
    std::os::unix::fs::symlink(&external, global.join("saves")).unwrap();
    chest.instance("bee", "1.19.2", "vanilla", &[], false);

    let inventory = chest.inventory();
    place_all(
        &inventory,
        &PlaceRequest::default(),
        &mut PolicyResolver::new(ConflictPolicy::Skip),
    )
    .unwrap();
    let link = chest.instance_root("bee").join("saves");
    assert!(link_target(&link).starts_with("..") || link_target(&link).starts_with(chest.chest()));

    let reports = break_all(&inventory, false).unwrap();
    assert_eq!(reports[0].relinked.len(), 1);
    assert_eq!(link_target(&link), external);
    assert_eq!(fs::read_to_string(link.join("level.dat")).unwrap(), "world");
    // The user's own link inside the box survives.
    assert!(is_symlink(&global.join("saves")));
}
