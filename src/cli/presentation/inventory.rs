//! Inventory views: the whole chest, one instance, one box.

use super::shared::{display_under, format_section_heading, table, to_json};
use crate::error::ChestError;
use crate::instance::Instance;
use crate::inventory::{BoxSummary, Inventory};
use crate::resolve::LinkPlan;
use crate::shulker_box::{MatchSection, ShulkerBox};
use serde_json::json;

fn join_or(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}

fn tags(instance: &Instance) -> String {
    instance.tags.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn match_summary(section: &MatchSection) -> String {
    let parts: Vec<String> = [
        ("instances", &section.instances),
        ("tags", &section.tags),
        ("minecraft", &section.minecraft),
        ("loader", &section.loader),
        ("server", &section.server),
    ]
    .iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(key, values)| format!("{} = {}", key, values.join(", ")))
    .collect();
    join_or(&parts, "global")
}

pub fn format_inventory_text(inventory: &Inventory) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n{}\n\n",
        format_section_heading(&format!("EnderChest: {}", inventory.name)),
        inventory.chest_root.display()
    ));

    out.push_str(&format!("{}\n", format_section_heading("Instances")));
    if inventory.instances.is_empty() {
        out.push_str("No instances registered.\n");
    } else {
        let mut t = table(vec!["Name", "Root", "Minecraft", "Loader", "Side", "Tags"]);
        for instance in &inventory.instances {
            t.add_row(vec![
                instance.name.clone(),
                display_under(&instance.root, &inventory.minecraft_root),
                instance.minecraft_version.clone(),
                instance.loader.clone(),
                instance.side.to_string(),
                tags(instance),
            ]);
        }
        out.push_str(&format!("{}\n", t));
    }

    out.push_str(&format!("\n{}\n", format_section_heading("Shulker boxes")));
    if inventory.boxes.is_empty() {
        out.push_str("No shulker boxes found.\n");
    } else {
        let mut t = table(vec!["Priority", "Name", "Match", "Depth"]);
        for summary in inventory.box_summaries() {
            t.add_row(vec![
                summary.priority.to_string(),
                summary.name.clone(),
                match_summary(&summary.match_section),
                summary.max_link_depth.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n", t));
    }

    if !inventory.remotes.is_empty() {
        out.push_str(&format!("\n{}\n", format_section_heading("Remotes")));
        let mut t = table(vec!["Alias", "URI"]);
        for remote in &inventory.remotes {
            t.add_row(vec![remote.alias.clone(), remote.uri.clone()]);
        }
        out.push_str(&format!("{}\n", t));
    }
    out.trim_end().to_string()
}

pub fn format_inventory_json(inventory: &Inventory) -> Result<String, ChestError> {
    to_json(&json!({
        "name": inventory.name,
        "minecraft_root": inventory.minecraft_root,
        "chest_root": inventory.chest_root,
        "instances": inventory.instances,
        "shulker_boxes": inventory.box_summaries(),
        "remotes": inventory.remotes,
        "settings": inventory.settings,
    }))
}

/// Matching boxes in processing order, then the resolved plan and anything it shadowed.
pub fn format_instance_text(
    instance: &Instance,
    boxes: &[&ShulkerBox],
    plan: &LinkPlan,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n{}\n\n",
        format_section_heading(&format!("Instance: {}", instance.name)),
        instance.root.display()
    ));

    let names: Vec<String> = boxes.iter().map(|b| b.name.clone()).collect();
    out.push_str(&format!(
        "Shulker boxes (lowest to highest precedence): {}\n\n",
        join_or(&names, "none")
    ));

    if plan.is_empty() {
        out.push_str("Nothing to link.\n");
    } else {
        let mut t = table(vec!["Path", "Shulker box", "Kind"]);
        for (relative, entry) in plan.iter() {
            t.add_row(vec![
                relative.display().to_string(),
                entry.shulker_box.clone(),
                format!("{:?}", entry.kind).to_lowercase(),
            ]);
        }
        out.push_str(&format!("{}\n", t));
    }

    if !plan.shadowed().is_empty() {
        out.push_str(&format!("\n{}\n", format_section_heading("Shadowed")));
        for shadowed in plan.shadowed() {
            out.push_str(&format!(
                "{} from {} (overridden by {})\n",
                shadowed.relative.display(),
                shadowed.shulker_box,
                shadowed.overridden_by
            ));
        }
    }
    out.trim_end().to_string()
}

pub fn format_instance_json(
    instance: &Instance,
    boxes: &[&ShulkerBox],
    plan: &LinkPlan,
) -> Result<String, ChestError> {
    let boxes: Vec<BoxSummary> = boxes.iter().map(|b| BoxSummary::from(*b)).collect();
    to_json(&json!({
        "instance": instance,
        "shulker_boxes": boxes,
        "plan": plan,
    }))
}

pub fn format_box_text(summary: &BoxSummary, instances: &[&Instance]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n{}\n\n",
        format_section_heading(&format!("Shulker box: {}", summary.name)),
        summary.root.display()
    ));
    out.push_str(&format!("Priority: {}\n", summary.priority));
    out.push_str(&format!("Match: {}\n", match_summary(&summary.match_section)));
    out.push_str(&format!("Max link depth: {}\n", summary.max_link_depth));
    if !summary.link_folders.is_empty() {
        let folders: Vec<String> = summary
            .link_folders
            .iter()
            .map(|f| f.display().to_string())
            .collect();
        out.push_str(&format!("Link folders: {}\n", folders.join(", ")));
    }
    let names: Vec<String> = instances.iter().map(|i| i.name.clone()).collect();
    out.push_str(&format!("\nApplies to: {}\n", join_or(&names, "no instances")));
    out.trim_end().to_string()
}

pub fn format_box_json(summary: &BoxSummary, instances: &[&Instance]) -> Result<String, ChestError> {
    let names: Vec<&str> = instances.iter().map(|i| i.name.as_str()).collect();
    to_json(&json!({
        "shulker_box": summary,
        "instances": names,
    }))
}
