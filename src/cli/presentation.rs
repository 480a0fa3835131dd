//! CLI presentation: text and json formatters per command family.

mod inventory;
mod links;
mod shared;
mod sync;

pub use inventory::{
    format_box_json, format_box_text, format_instance_json, format_instance_text,
    format_inventory_json, format_inventory_text,
};
pub use links::{
    format_break_json, format_break_text, format_placement_json, format_placement_text,
};
pub use shared::{format_section_heading, to_json};
pub use sync::{format_sync_json, format_sync_text};
