use crate::error::ChestError;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

/// Pretty JSON for any report type.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ChestError> {
    serde_json::to_string_pretty(value).map_err(|e| ChestError::Render(e.to_string()))
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub(super) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

/// Show `path` relative to `base` when it lies inside it.
pub(super) fn display_under(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

pub(super) fn dry_run_suffix(dry_run: bool) -> &'static str {
    if dry_run {
        " (dry run)"
    } else {
        ""
    }
}
