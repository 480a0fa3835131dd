//! Resolver: merge the boxes that match an instance into a single link plan.
//!
//! Boxes are processed in ascending (priority, name) order and every leaf
//! unconditionally overwrites whatever an earlier box put at the same path, so the
//! highest-priority box (alphabetically last on ties) wins. When two boxes reach the
//! same path through different folder layouts the outcome is simply whichever was
//! processed last.

mod plan;

pub use plan::{LinkPlan, PlanEntry, Shadowed};

use crate::error::ChestError;
use crate::instance::Instance;
use crate::matcher;
use crate::shulker_box::ShulkerBox;
use crate::tree::walker::{Contribution, Walker};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// Resolver over one immutable set of boxes. Each box is walked at most once per
/// resolver, however many instances it is resolved for.
pub struct Resolver<'a> {
    boxes: Vec<&'a ShulkerBox>,
    contributions: HashMap<PathBuf, Vec<Contribution>>,
}

impl<'a> Resolver<'a> {
    /// Build a resolver, rejecting box sets whose processing order would be ambiguous.
    pub fn new(boxes: &'a [ShulkerBox]) -> Result<Self, ChestError> {
        let mut seen = HashSet::new();
        for shulker_box in boxes {
            if !seen.insert((shulker_box.priority, shulker_box.name.as_str())) {
                return Err(ChestError::Config(format!(
                    "Two shulker boxes share priority {} and name '{}'",
                    shulker_box.priority, shulker_box.name
                )));
            }
        }

        let mut ordered: Vec<&ShulkerBox> = boxes.iter().collect();
        ordered.sort_by(|a, b| ShulkerBox::processing_order(a, b));
        Ok(Self {
            boxes: ordered,
            contributions: HashMap::new(),
        })
    }

    /// Compute the link plan for one instance. Reads box trees; never writes.
    pub fn resolve(&mut self, instance: &Instance) -> Result<LinkPlan, ChestError> {
        let mut plan = LinkPlan::new();
        for shulker_box in self.boxes.iter().copied() {
            if !matcher::matches(instance, shulker_box) {
                continue;
            }
            debug!(
                instance = %instance.name,
                shulker_box = %shulker_box.name,
                priority = shulker_box.priority,
                "Applying shulker box"
            );

            if !self.contributions.contains_key(&shulker_box.root) {
                let walked = Walker::for_box(shulker_box).walk()?;
                self.contributions.insert(shulker_box.root.clone(), walked);
            }
            let leaves = self
                .contributions
                .get(&shulker_box.root)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for leaf in leaves {
                plan.insert(
                    leaf.relative.clone(),
                    PlanEntry {
                        source: leaf.source.clone(),
                        shulker_box: shulker_box.name.clone(),
                        kind: leaf.kind,
                    },
                );
            }
        }
        debug!(instance = %instance.name, entries = plan.len(), "Resolved link plan");
        Ok(plan)
    }
}

/// Compute the link plan for `instance` from `boxes`.
pub fn resolve(instance: &Instance, boxes: &[ShulkerBox]) -> Result<LinkPlan, ChestError> {
    Resolver::new(boxes)?.resolve(instance)
}
