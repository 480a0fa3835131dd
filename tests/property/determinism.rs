//! Property-based tests for determinism and precedence guarantees

use enderchest::instance::Instance;
use enderchest::matcher;
use enderchest::resolve::resolve;
use enderchest::shulker_box::{MatchSection, MatchSpecification, ShulkerBox};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FILES: &[&str] = &[
    "options.txt",
    "servers.dat",
    "mods/sodium.jar",
    "mods/lithium.jar",
    "config/sodium/options.json",
    "resourcepacks/faithful.zip",
];

fn runner(cases: u32) -> TestRunner {
    TestRunner::new(Config {
        cases,
        ..Config::default()
    })
}

/// Write a box with the selected files, each containing the box name.
fn build_box(chest: &Path, name: &str, priority: i64, files: &[bool]) -> ShulkerBox {
    let root = chest.join(name);
    fs::create_dir_all(&root).unwrap();
    for (file, selected) in FILES.iter().zip(files) {
        if *selected {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name).unwrap();
        }
    }
    ShulkerBox::new(name, root).with_priority(priority)
}

fn box_strategy() -> impl Strategy<Value = (i64, Vec<bool>)> {
    (-5i64..5, proptest::collection::vec(any::<bool>(), FILES.len()))
}

/// Resolving the same boxes twice, in any input order, yields the same plan.
#[test]
fn test_resolve_is_deterministic_property() {
    runner(24)
        .run(
            &proptest::collection::vec(box_strategy(), 1..5),
            |boxes| {
                let temp = TempDir::new().unwrap();
                let chest = temp.path().join("EnderChest");
                let built: Vec<ShulkerBox> = boxes
                    .iter()
                    .enumerate()
                    .map(|(i, (priority, files))| {
                        build_box(&chest, &format!("box{}", i), *priority, files)
                    })
                    .collect();
                let instance = Instance::new("a", temp.path().join("instance"));

                let first = resolve(&instance, &built).unwrap();
                let second = resolve(&instance, &built).unwrap();
                let mut reversed = built.clone();
                reversed.reverse();
                let third = resolve(&instance, &reversed).unwrap();

                prop_assert_eq!(&first, &second);
                prop_assert_eq!(&first, &third);
                Ok(())
            },
        )
        .unwrap();
}

/// A strictly higher priority always wins a contested path, whatever the names.
#[test]
fn test_priority_precedence_property() {
    runner(32)
        .run(
            &("[a-z]{1,8}", "[a-z]{1,8}", -100i64..100, 1i64..50),
            |(low_name, high_name, low_priority, gap)| {
                prop_assume!(low_name != high_name);
                let temp = TempDir::new().unwrap();
                let chest = temp.path().join("EnderChest");
                let only_options: Vec<bool> = FILES.iter().map(|f| *f == "options.txt").collect();
                let boxes = vec![
                    build_box(&chest, &high_name, low_priority + gap, &only_options),
                    build_box(&chest, &low_name, low_priority, &only_options),
                ];
                let instance = Instance::new("a", temp.path().join("instance"));

                let plan = resolve(&instance, &boxes).unwrap();
                let entry = plan.get(Path::new("options.txt")).unwrap();
                prop_assert_eq!(&entry.shulker_box, &high_name);
                Ok(())
            },
        )
        .unwrap();
}

/// A tag that is both included and excluded never matches.
#[test]
fn test_exclusion_dominates_property() {
    runner(64)
        .run(
            &(
                "[a-z]{1,6}",
                proptest::collection::btree_set("[a-z]{1,6}", 0..4),
            ),
            |(tag, extra)| {
                let section = MatchSection {
                    tags: vec![tag.clone(), format!("!{}", tag), "*".to_string()],
                    ..MatchSection::default()
                };
                let spec = MatchSpecification::parse(&section).unwrap();
                let shulker_box = ShulkerBox::new("b", "/chest/b").with_match_spec(spec);
                let instance = Instance::new("a", "/instances/a")
                    .with_tags(extra.into_iter().chain(std::iter::once(tag)));
                prop_assert!(!matcher::matches(&instance, &shulker_box));
                Ok(())
            },
        )
        .unwrap();
}
