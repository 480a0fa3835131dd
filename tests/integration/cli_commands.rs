//! End-to-end command routing through `RunContext`.

use super::test_utils::{with_xdg_env, ChestFixture};
use clap::Parser;
use enderchest::cli::{map_error, Cli, RunContext};
use enderchest::error::ChestError;
use std::fs;

fn chest() -> ChestFixture {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "[properties]\npriority = -20\n");
    chest.put("Global/options.txt", "global");
    chest.shulker_box("Fabric", "[match]\nloader = [\"fabric\"]\n");
    chest.put("Fabric/mods/sodium.jar", "sodium");
    chest.instance("bee", "1.19.2", "fabric", &["modded"], false);
    chest.instance("ant", "1.19.2", "vanilla", &[], false);
    chest
}

fn run(chest: &ChestFixture, args: &[&str]) -> Result<String, ChestError> {
    let root = chest.root.display().to_string();
    let mut argv = vec!["enderchest", "--root", root.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let context = with_xdg_env(&chest.temp, || RunContext::new(cli.root.clone(), cli.config.clone()))?
        .with_interactive(false);
    context.execute(&cli.command)
}

#[cfg(unix)]
#[test]
fn test_inventory_for_instance_as_json() {
    let chest = chest();
    let output = run(&chest, &["inventory", "--instance", "bee", "--format", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["instance"]["name"], "bee");
    let boxes: Vec<_> = value["shulker_boxes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(boxes, vec!["Global", "Fabric"]);
    assert_eq!(value["plan"]["entries"]["mods/sodium.jar"]["shulker_box"], "Fabric");
}

#[test]
fn test_inventory_for_box_as_text() {
    let chest = chest();
    let output = run(&chest, &["inventory", "--box", "Fabric"]).unwrap();
    assert!(output.contains("loader = fabric"));
    assert!(output.contains("Applies to: bee"));
    assert!(!output.contains("Applies to: bee, ant"));
}

#[test]
fn test_unknown_instance_is_reported() {
    let chest = chest();
    let err = run(&chest, &["inventory", "--instance", "nope"]).unwrap_err();
    assert!(map_error(&err).contains("nope"));
}

#[cfg(unix)]
#[test]
fn test_place_then_break_round_trip() {
    let chest = chest();
    let output = run(&chest, &["place", "--format", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);

    let bee = chest.instance_root("bee");
    assert!(fs::symlink_metadata(bee.join("mods/sodium.jar"))
        .unwrap()
        .file_type()
        .is_symlink());

    let output = run(&chest, &["break", "--yes"]).unwrap();
    assert!(output.contains("bee: 2 materialized, 0 relinked, 0 failed"));
    assert!(!fs::symlink_metadata(bee.join("mods/sodium.jar"))
        .unwrap()
        .file_type()
        .is_symlink());
}

#[cfg(unix)]
#[test]
fn test_non_interactive_prompt_policy_skips_conflicts() {
    let chest = chest();
    fs::write(chest.instance_root("ant").join("options.txt"), "mine").unwrap();
    let output = run(&chest, &["place", "--instance", "ant"]).unwrap();
    assert!(output.contains("ant: 0 created, 0 updated, 0 already correct, 1 skipped, 0 failed"));
    assert_eq!(
        fs::read_to_string(chest.instance_root("ant").join("options.txt")).unwrap(),
        "mine"
    );
}

#[cfg(unix)]
#[test]
fn test_fail_policy_surfaces_as_conflict() {
    let chest = chest();
    fs::write(chest.instance_root("ant").join("options.txt"), "mine").unwrap();
    let err = run(&chest, &["place", "--conflict", "fail"]).unwrap_err();
    match err {
        ChestError::Interrupted { error, .. } => match *error {
            ChestError::Conflict { path, .. } => assert!(path.ends_with("options.txt")),
            other => panic!("expected conflict, got {other:?}"),
        },
        other => panic!("expected an interrupted placement, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_stopped_placement_keeps_earlier_reports() {
    let chest = chest();
    fs::write(chest.instance_root("ant").join("options.txt"), "mine").unwrap();
    let err = run(&chest, &["place", "--dry-run", "--conflict", "fail"]).unwrap_err();
    let ChestError::Interrupted { output, .. } = &err else {
        panic!("expected an interrupted placement, got {err:?}");
    };
    assert!(output.contains("bee: 2 created, 0 updated, 0 already correct, 0 skipped, 0 failed"));
    assert!(output.contains("mods/sodium.jar"));
    assert!(output.contains("Aborted"));
    assert!(map_error(&err).contains("options.txt"));
}

#[cfg(unix)]
#[test]
fn test_keep_broken_links_flag_leaves_dangling_links() {
    let chest = chest();
    let broken = chest.instance_root("ant").join("gone.txt");
    std::os::unix::fs::symlink(chest.chest().join("Global/gone.txt"), &broken).unwrap();

    run(&chest, &["place", "--instance", "ant", "--keep-broken-links"]).unwrap();
    assert!(fs::symlink_metadata(&broken).is_ok());

    let output = run(&chest, &["place", "--instance", "ant"]).unwrap();
    assert!(output.contains("Removed broken link gone.txt"));
    assert!(fs::symlink_metadata(&broken).is_err());
}

#[test]
fn test_push_dry_run_needs_no_confirmation() {
    let mut chest = chest();
    let remote = chest.temp.path().join("laptop");
    fs::create_dir_all(&remote).unwrap();
    chest.remote(&remote.display().to_string(), "laptop");

    let output = run(&chest, &["push", "--dry-run"]).unwrap();
    assert!(output.contains("laptop"));
    assert!(!remote.join("EnderChest").exists());

    run(&chest, &["push", "--yes"]).unwrap();
    assert!(remote.join("EnderChest/Global/options.txt").is_file());
}

#[test]
fn test_partial_push_reports_every_remote() {
    let mut chest = chest();
    let missing = chest.temp.path().join("missing");
    let laptop = chest.temp.path().join("laptop");
    fs::create_dir_all(&laptop).unwrap();
    chest.remote(&missing.display().to_string(), "desk");
    chest.remote(&laptop.display().to_string(), "laptop");

    let err = run(&chest, &["push", "--yes"]).unwrap_err();
    let ChestError::Interrupted { output, .. } = &err else {
        panic!("expected an interrupted push, got {err:?}");
    };
    assert!(output.contains("desk"));
    assert!(output.contains("laptop"));
    let message = map_error(&err);
    assert!(message.contains("Push failed for 1 of 2 remotes"));
    assert!(message.contains("desk:"));
    assert!(laptop.join("EnderChest/Global/options.txt").is_file());
}
