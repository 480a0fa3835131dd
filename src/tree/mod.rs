//! Filesystem traversal and path utilities shared by resolution, placement, and breaking.

pub mod path;
pub mod walker;
