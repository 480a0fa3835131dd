//! Matching and resolution against a chest on disk.

use super::test_utils::ChestFixture;
use std::path::Path;

fn example_chest() -> ChestFixture {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "[properties]\npriority = -20\n");
    chest.put("Global/options.txt", "global options");
    chest.put("Global/servers.dat", "servers");
    chest.shulker_box(
        "Fabric120",
        "[properties]\npriority = 0\n\n[match]\nloader = [\"fabric\"]\n",
    );
    chest.put("Fabric120/options.txt", "fabric options");
    chest.put("Fabric120/mods/sodium.jar", "sodium");
    chest.shulker_box("NoFabric", "[match]\nloader = [\"!fabric\"]\n");
    chest.put("NoFabric/mods/optifine.jar", "optifine");
    chest.instance("I", "1.20", "fabric", &["modded"], false);
    chest.instance("V", "1.20", "vanilla", &[], false);
    chest
}

#[test]
fn test_example_scenario_plan() {
    let chest = example_chest();
    let inventory = chest.inventory();
    let plan = inventory.plan_for_instance("I").unwrap();

    let options = plan.get(Path::new("options.txt")).unwrap();
    assert_eq!(options.shulker_box, "Fabric120");
    assert_eq!(options.source, chest.chest().join("Fabric120/options.txt"));

    let sodium = plan.get(Path::new("mods/sodium.jar")).unwrap();
    assert_eq!(sodium.shulker_box, "Fabric120");
    assert_eq!(plan.get(Path::new("servers.dat")).unwrap().shulker_box, "Global");
    assert!(plan.get(Path::new("mods/optifine.jar")).is_none());
    assert!(plan.iter().all(|(_, entry)| entry.shulker_box != "NoFabric"));
}

#[test]
fn test_vanilla_instance_gets_global_and_excluding_box() {
    let chest = example_chest();
    let inventory = chest.inventory();
    let plan = inventory.plan_for_instance("V").unwrap();

    assert_eq!(plan.get(Path::new("options.txt")).unwrap().shulker_box, "Global");
    assert_eq!(
        plan.get(Path::new("mods/optifine.jar")).unwrap().shulker_box,
        "NoFabric"
    );
    assert!(plan.get(Path::new("mods/sodium.jar")).is_none());
}

#[test]
fn test_priority_beats_name_order() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("aaa", "[properties]\npriority = 10\n");
    chest.put("aaa/config.txt", "high");
    chest.shulker_box("zzz", "[properties]\npriority = 0\n");
    chest.put("zzz/config.txt", "low");
    chest.instance("a", "1.19.2", "vanilla", &[], false);

    let plan = chest.inventory().plan_for_instance("a").unwrap();
    assert_eq!(plan.get(Path::new("config.txt")).unwrap().shulker_box, "aaa");
}

#[test]
fn test_equal_priority_later_name_wins() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("beta", "");
    chest.put("beta/config.txt", "beta");
    chest.shulker_box("alpha", "");
    chest.put("alpha/config.txt", "alpha");
    chest.instance("a", "1.19.2", "vanilla", &[], false);

    let plan = chest.inventory().plan_for_instance("a").unwrap();
    let entry = plan.get(Path::new("config.txt")).unwrap();
    assert_eq!(entry.shulker_box, "beta");
    assert_eq!(plan.shadowed().len(), 1);
    assert_eq!(plan.shadowed()[0].shulker_box, "alpha");
}

#[test]
fn test_exclusion_dominates_inclusion() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Tagged", "[match]\ntags = [\"modded\", \"!hardcore\"]\n");
    chest.put("Tagged/options.txt", "x");
    chest.instance("plain", "1.20.1", "fabric", &["modded"], false);
    chest.instance("hard", "1.20.1", "fabric", &["modded", "hardcore"], false);

    let inventory = chest.inventory();
    let names: Vec<_> = inventory
        .instances_for_box("Tagged")
        .unwrap()
        .iter()
        .map(|i| i.name.clone())
        .collect();
    assert_eq!(names, vec!["plain"]);
}

#[test]
fn test_server_flag_and_version_globs() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("ClientOnly", "[match]\nserver = [\"!server\"]\n");
    chest.shulker_box("ServerOnly", "[match]\nserver = [\"server\"]\n");
    chest.shulker_box("Modern", "[match]\nminecraft = [\"1.20*\"]\n");
    chest.instance("client", "1.20.1", "vanilla", &[], false);
    chest.instance("server", "1.19.4", "vanilla", &[], true);

    let inventory = chest.inventory();
    let boxes_for = |name: &str| -> Vec<String> {
        inventory
            .boxes_for_instance(name)
            .unwrap()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    };
    assert_eq!(boxes_for("client"), vec!["ClientOnly", "Modern"]);
    assert_eq!(boxes_for("server"), vec!["ServerOnly"]);
}

#[test]
fn test_directories_below_top_level_are_linked_whole() {
    let mut chest = ChestFixture::new();
    chest.shulker_box("Global", "link_folders = [\"resourcepacks\"]\n");
    chest.put("Global/config/sodium/options.json", "{}");
    chest.put("Global/config/top.toml", "x");
    chest.put("Global/resourcepacks/pack.zip", "zip");
    chest.instance("a", "1.20.1", "fabric", &[], false);

    let plan = chest.inventory().plan_for_instance("a").unwrap();
    let paths: Vec<String> = plan
        .iter()
        .map(|(p, _)| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        paths,
        vec!["config/sodium", "config/top.toml", "resourcepacks"]
    );
}
