//! Push to every remote in order; pull from the first that works.

use super::test_utils::ChestFixture;
use enderchest::error::ChestError;
use enderchest::orchestrate::{pull, push};
use enderchest::sync::{ChangeKind, Direction};
use std::fs;
use std::path::PathBuf;

fn remote_root(chest: &ChestFixture, name: &str, create: bool) -> PathBuf {
    let path = chest.temp.path().join("remotes").join(name);
    if create {
        fs::create_dir_all(&path).unwrap();
    }
    path
}

#[test]
fn test_push_attempts_every_remote_and_reports_failure() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "");
    chest.put("Global/options.txt", "options");
    let missing = remote_root(&chest, "missing", false);
    let laptop = remote_root(&chest, "laptop", true);
    chest.remote(&missing.display().to_string(), "missing");
    chest.remote(&laptop.display().to_string(), "laptop");

    let result = push(&chest.inventory(), false);
    match result {
        Err(ChestError::PushIncomplete {
            failed: 1,
            attempted: 2,
            report,
        }) => {
            assert!(!report.outcomes[0].succeeded());
            assert_eq!(report.outcomes[0].alias, "missing");
            assert!(report.outcomes[1].succeeded());
        }
        other => panic!("expected an incomplete push, got {other:?}"),
    }
    // The failing first remote did not stop the second.
    assert_eq!(
        fs::read_to_string(laptop.join("EnderChest/Global/options.txt")).unwrap(),
        "options"
    );
    // The chest config is not replicated by default.
    assert!(!laptop.join("EnderChest/enderchest.toml").exists());
}

#[test]
fn test_push_dry_run_reports_changes_without_copying() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "");
    chest.put("Global/options.txt", "options");
    let laptop = remote_root(&chest, "laptop", true);
    chest.remote(&laptop.display().to_string(), "laptop");

    let report = push(&chest.inventory(), true).unwrap();
    assert_eq!(report.direction, Direction::Push);
    assert!(report.dry_run);
    let changes = &report.outcomes[0].changes;
    assert!(changes
        .iter()
        .any(|c| c.kind == ChangeKind::Create && c.path == PathBuf::from("Global/options.txt")));
    assert!(!laptop.join("EnderChest").exists());
}

#[test]
fn test_pull_uses_first_working_remote_only() {
    let mut chest = ChestFixture::new();
    let missing = remote_root(&chest, "missing", false);
    let first = remote_root(&chest, "first", true);
    let second = remote_root(&chest, "second", true);
    fs::create_dir_all(first.join("EnderChest/Global")).unwrap();
    fs::write(first.join("EnderChest/Global/options.txt"), "from first").unwrap();
    fs::create_dir_all(second.join("EnderChest/Global")).unwrap();
    fs::write(second.join("EnderChest/Global/options.txt"), "from second").unwrap();
    chest.remote(&missing.display().to_string(), "missing");
    chest.remote(&first.display().to_string(), "first");
    chest.remote(&second.display().to_string(), "second");

    let report = pull(&chest.inventory(), false).unwrap();
    let aliases: Vec<_> = report.outcomes.iter().map(|o| o.alias.as_str()).collect();
    assert_eq!(aliases, vec!["missing", "first"]);
    assert!(!report.outcomes[0].succeeded());
    assert_eq!(
        fs::read_to_string(chest.chest().join("Global/options.txt")).unwrap(),
        "from first"
    );
    // Local config survives a pull because it is excluded.
    assert!(chest.chest().join("enderchest.toml").exists());
}

#[test]
fn test_pull_with_no_working_remote_fails() {
    let mut chest = ChestFixture::new();
    let missing = remote_root(&chest, "missing", false);
    chest.remote(&missing.display().to_string(), "missing");
    assert!(matches!(
        pull(&chest.inventory(), false),
        Err(ChestError::NoRemoteSucceeded(1))
    ));
}

#[test]
fn test_mirror_deletes_extraneous_files_on_push() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "");
    chest.put("Global/options.txt", "options");
    let laptop = remote_root(&chest, "laptop", true);
    fs::create_dir_all(laptop.join("EnderChest/Old")).unwrap();
    fs::write(laptop.join("EnderChest/Old/stale.txt"), "stale").unwrap();
    chest.remote(&laptop.display().to_string(), "laptop");

    let report = push(&chest.inventory(), false).unwrap();
    assert!(report.outcomes[0]
        .changes
        .iter()
        .any(|c| c.kind == ChangeKind::Delete));
    assert!(!laptop.join("EnderChest/Old").exists());
}
