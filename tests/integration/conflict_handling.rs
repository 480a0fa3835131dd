//! Obstructions in instances: skip, overwrite, abort.
#![cfg(unix)]

use super::test_utils::{is_symlink, ChestFixture};
use enderchest::orchestrate::{place_all, PlaceRequest};
use enderchest::place::{
    ConflictPolicy, Decision, Outcome, PolicyResolver, ScriptedResolver,
};
use std::fs;
use std::path::{Path, PathBuf};

fn chest() -> ChestFixture {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "");
    chest.put("Global/a.txt", "a");
    chest.put("Global/b.txt", "b");
    chest.put("Global/c.txt", "c");
    chest.put("Global/saves/world/level.dat", "level");
    chest.instance("one", "1.19.2", "vanilla", &[], false);
    chest.instance("two", "1.19.2", "vanilla", &[], false);
    chest
}

fn outcome(report: &enderchest::place::PlacementReport, relative: &str) -> Outcome {
    report
        .entries
        .iter()
        .find(|e| e.relative == Path::new(relative))
        .map(|e| e.outcome)
        .unwrap()
}

#[test]
fn test_skip_does_not_block_unrelated_entries() {
    let chest = chest();
    let root = chest.instance_root("one");
    fs::write(root.join("b.txt"), "local b").unwrap();

    let inventory = chest.inventory();
    let request = PlaceRequest {
        instances: vec!["one".to_string()],
        ..PlaceRequest::default()
    };
    let mut conflicts = ScriptedResolver::new([Decision::Skip]);
    let reports = place_all(&inventory, &request, &mut conflicts).unwrap();

    assert_eq!(conflicts.asked(), &[root.join("b.txt")]);
    assert_eq!(outcome(&reports[0], "a.txt"), Outcome::Created);
    assert_eq!(outcome(&reports[0], "b.txt"), Outcome::Skipped);
    assert_eq!(outcome(&reports[0], "c.txt"), Outcome::Created);
    assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "local b");
}

#[test]
fn test_overwrite_replaces_non_empty_directory() {
    let chest = chest();
    let root = chest.instance_root("one");
    fs::create_dir_all(root.join("saves/world")).unwrap();
    fs::write(root.join("saves/world/local.dat"), "local").unwrap();

    let inventory = chest.inventory();
    let mut conflicts = PolicyResolver::new(ConflictPolicy::Overwrite);
    let reports = place_all(&inventory, &PlaceRequest::default(), &mut conflicts).unwrap();

    let entry = reports[0]
        .entries
        .iter()
        .find(|e| e.relative == PathBuf::from("saves/world"))
        .unwrap();
    assert_eq!(entry.outcome, Outcome::Updated);
    assert!(entry.detail.as_deref().unwrap().contains("replaced"));
    assert!(is_symlink(&root.join("saves/world")));
    assert!(root.join("saves/world/level.dat").exists());
    // The chest copy is untouched.
    assert!(!chest.chest().join("Global/saves/world/local.dat").exists());
}

#[test]
fn test_empty_directory_counts_as_absent() {
    let chest = chest();
    let root = chest.instance_root("one");
    fs::create_dir_all(root.join("saves/world")).unwrap();

    let inventory = chest.inventory();
    let mut conflicts = ScriptedResolver::new([]);
    let reports = place_all(&inventory, &PlaceRequest::default(), &mut conflicts).unwrap();
    assert!(conflicts.asked().is_empty());
    assert_eq!(outcome(&reports[0], "saves/world"), Outcome::Created);
}

#[test]
fn test_abort_keeps_earlier_links_and_stops_the_run() {
    let chest = chest();
    let root = chest.instance_root("one");
    fs::write(root.join("b.txt"), "local b").unwrap();

    let inventory = chest.inventory();
    let mut conflicts = ScriptedResolver::new([Decision::Abort]);
    let reports = place_all(&inventory, &PlaceRequest::default(), &mut conflicts).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].aborted_at, Some(root.join("b.txt")));
    assert!(is_symlink(&root.join("a.txt")));
    assert!(!root.join("c.txt").exists());
    assert!(!chest.instance_root("two").join("a.txt").exists());
}

#[test]
fn test_fail_policy_aborts_at_first_conflict() {
    let chest = chest();
    fs::write(chest.instance_root("one").join("a.txt"), "local").unwrap();

    let inventory = chest.inventory();
    let mut conflicts = PolicyResolver::new(ConflictPolicy::Fail);
    let reports = place_all(&inventory, &PlaceRequest::default(), &mut conflicts).unwrap();
    assert!(reports[0].is_aborted());
    assert_eq!(reports[0].entries.len(), 1);
    assert_eq!(outcome(&reports[0], "a.txt"), Outcome::Failed);
}

#[test]
fn test_link_inside_chest_directory_is_refused() {
    let chest = chest();
    let root = chest.instance_root("one");
    // The user linked the whole saves folder into the chest by hand.
    std::os::unix::fs::symlink(chest.chest().join("Global/saves"), root.join("saves")).unwrap();

    let inventory = chest.inventory();
    let keep = PlaceRequest {
        keep_broken_links: true,
        ..PlaceRequest::default()
    };
    let reports = place_all(&inventory, &keep, &mut ScriptedResolver::new([])).unwrap();
    let entry = reports[0]
        .entries
        .iter()
        .find(|e| e.relative == PathBuf::from("saves/world"))
        .unwrap();
    assert_eq!(entry.outcome, Outcome::Failed);
    assert!(entry.detail.as_deref().unwrap().contains("EnderChest"));
    assert!(!is_symlink(&chest.chest().join("Global/saves/world")));
}
