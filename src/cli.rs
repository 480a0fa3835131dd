//! CLI domain: parse, route, help, output, prompts, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod prompt;
mod route;

pub use help::{command_name, is_mutating};
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_box_json, format_box_text, format_break_json, format_break_text,
    format_instance_json, format_instance_text, format_inventory_json, format_inventory_text,
    format_placement_json, format_placement_text, format_section_heading, format_sync_json,
    format_sync_text, to_json,
};
pub use prompt::{confirm, PromptResolver};
pub use route::RunContext;
