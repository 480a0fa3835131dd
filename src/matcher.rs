//! Matcher: does a shulker box apply to an instance?

use crate::instance::{normalize_loader, Instance};
use crate::shulker_box::ShulkerBox;

/// True when every category of the box's match specification accepts the instance.
///
/// Pure and total: no I/O, never fails.
pub fn matches(instance: &Instance, shulker_box: &ShulkerBox) -> bool {
    let spec = &shulker_box.match_spec;
    let loader = normalize_loader(&instance.loader);

    spec.instances.evaluate(|p| p.is_match(&instance.name))
        && spec
            .tags
            .evaluate(|p| instance.tags.iter().any(|tag| p.is_match(tag)))
        && spec
            .versions
            .evaluate(|p| p.is_match(&instance.minecraft_version))
        && spec.loaders.evaluate(|p| p.is_match(&loader))
        && spec.side.evaluate(|side| *side == instance.side)
}

/// The boxes (from a slice already in processing order) that apply to `instance`.
pub fn matching_boxes<'a>(
    instance: &Instance,
    boxes: &'a [ShulkerBox],
) -> Vec<&'a ShulkerBox> {
    boxes.iter().filter(|b| matches(instance, b)).collect()
}
