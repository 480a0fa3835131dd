//! EnderChest: one folder of shared Minecraft assets, linked into many instances.
//!
//! Shulker boxes inside the EnderChest folder declare which instances they apply to.
//! The resolver turns the matching boxes into a link plan per instance, the placement
//! engine materializes that plan as symlinks, the breaker undoes it, and the sync
//! layer replicates the chest folder between machines.

pub mod breaker;
pub mod cli;
pub mod config;
pub mod error;
pub mod instance;
pub mod inventory;
pub mod logging;
pub mod matcher;
pub mod orchestrate;
pub mod place;
pub mod resolve;
pub mod shulker_box;
pub mod sync;
pub mod tree;
