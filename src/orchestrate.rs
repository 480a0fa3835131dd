//! Whole-chest operations: place, break, push, pull.
//!
//! Each operation takes the inventory snapshot explicitly and works instance by
//! instance (or remote by remote) in configured order.

use crate::breaker::{break_instance, BreakReport};
use crate::error::ChestError;
use crate::instance::Instance;
use crate::inventory::Inventory;
use crate::place::{ConflictResolver, PlaceOptions, PlacementReport, Placer};
use crate::resolve::Resolver;
use crate::sync::{self, SyncReport, Transport, TransportError, Remote};
use tracing::{info, warn};

/// Options for [`place_all`].
#[derive(Debug, Clone, Default)]
pub struct PlaceRequest {
    pub dry_run: bool,
    /// Force absolute link targets regardless of the chest setting
    pub absolute: bool,
    /// Restrict to these instance names; empty means every instance
    pub instances: Vec<String>,
    /// Leave broken and stale links in the instances alone
    pub keep_broken_links: bool,
}

fn selected<'a>(inventory: &'a Inventory, names: &[String]) -> Result<Vec<&'a Instance>, ChestError> {
    if names.is_empty() {
        return Ok(inventory.instances.iter().collect());
    }
    names.iter().map(|name| inventory.instance(name)).collect()
}

/// Resolve and place links for every selected instance.
///
/// An operator abort stops the whole run: the aborted instance's report is the last
/// one returned, and later instances are left untouched.
pub fn place_all(
    inventory: &Inventory,
    request: &PlaceRequest,
    conflicts: &mut dyn ConflictResolver,
) -> Result<Vec<PlacementReport>, ChestError> {
    let instances = selected(inventory, &request.instances)?;
    if instances.is_empty() {
        warn!("No instances are registered with this EnderChest");
    }

    let options = PlaceOptions {
        dry_run: request.dry_run,
        relative: inventory.settings.relative_links && !request.absolute,
        allowlist: inventory.settings.offer_to_update_symlink_allowlist,
        cleanup: !request.keep_broken_links,
    };
    let mut resolver = Resolver::new(&inventory.boxes)?;
    let mut placer = Placer::new(&inventory.chest_root, options, conflicts)?;

    let mut reports = Vec::new();
    for instance in instances {
        let plan = resolver.resolve(instance)?;
        info!(instance = %instance.name, entries = plan.len(), "Placing links");
        let report = placer.place(instance, &plan)?;
        let aborted = report.is_aborted();
        reports.push(report);
        if aborted {
            warn!(instance = %instance.name, "Stopping placement after abort");
            break;
        }
    }
    Ok(reports)
}

/// Break links in every instance.
pub fn break_all(inventory: &Inventory, dry_run: bool) -> Result<Vec<BreakReport>, ChestError> {
    inventory
        .instances
        .iter()
        .map(|instance| break_instance(instance, &inventory.chest_root, dry_run))
        .collect()
}

/// Push the chest to every remote using the given transport factory.
pub fn push_with<F>(inventory: &Inventory, connect: F, dry_run: bool) -> Result<SyncReport, ChestError>
where
    F: FnMut(&Remote) -> Result<Box<dyn Transport>, TransportError>,
{
    sync::push_all(
        &inventory.remotes,
        connect,
        &inventory.chest_root,
        &inventory.settings.do_not_sync,
        dry_run,
    )
}

/// Pull the chest from the first working remote using the given transport factory.
pub fn pull_with<F>(inventory: &Inventory, connect: F, dry_run: bool) -> Result<SyncReport, ChestError>
where
    F: FnMut(&Remote) -> Result<Box<dyn Transport>, TransportError>,
{
    sync::pull_first(
        &inventory.remotes,
        connect,
        &inventory.chest_root,
        &inventory.settings.do_not_sync,
        dry_run,
    )
}

pub fn push(inventory: &Inventory, dry_run: bool) -> Result<SyncReport, ChestError> {
    push_with(inventory, sync::connect, dry_run)
}

pub fn pull(inventory: &Inventory, dry_run: bool) -> Result<SyncReport, ChestError> {
    pull_with(inventory, sync::connect, dry_run)
}
