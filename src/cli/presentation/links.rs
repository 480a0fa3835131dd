//! Placement and break reports.

use super::shared::{dry_run_suffix, format_section_heading, table, to_json};
use crate::breaker::BreakReport;
use crate::error::ChestError;
use crate::place::{Outcome, PlacementReport};
use owo_colors::OwoColorize;
use std::path::Path;

fn colored_outcome(outcome: Outcome) -> String {
    match outcome {
        Outcome::Created | Outcome::Updated => outcome.green().to_string(),
        Outcome::AlreadyCorrect => outcome.dimmed().to_string(),
        Outcome::Skipped => outcome.yellow().to_string(),
        Outcome::Failed => outcome.red().to_string(),
    }
}

/// One section per instance: a table of every entry that is not already correct,
/// followed by the summary counts.
pub fn format_placement_text(reports: &[PlacementReport], chest_root: &Path) -> String {
    if reports.is_empty() {
        return "No instances to place links into.".to_string();
    }
    let mut out = String::new();
    for report in reports {
        out.push_str(&format_section_heading(&format!(
            "{}{}",
            report.instance,
            dry_run_suffix(report.dry_run)
        )));
        out.push('\n');

        for removed in &report.removed {
            out.push_str(&format!(
                "{} {} link {}\n",
                if report.dry_run { "Would remove" } else { "Removed" },
                removed.reason,
                removed.relative.display()
            ));
        }

        let changed: Vec<_> = report
            .entries
            .iter()
            .filter(|e| e.outcome != Outcome::AlreadyCorrect)
            .collect();
        if !changed.is_empty() {
            let mut t = table(vec!["Path", "Outcome", "Source", "Detail"]);
            for entry in changed {
                t.add_row(vec![
                    entry.relative.display().to_string(),
                    colored_outcome(entry.outcome),
                    super::shared::display_under(&entry.source, chest_root),
                    entry.detail.clone().unwrap_or_default(),
                ]);
            }
            out.push_str(&t.to_string());
            out.push('\n');
        }
        out.push_str(&report.summary());
        out.push('\n');
        if let Some(path) = &report.aborted_at {
            out.push_str(&format!("{} at {}\n", "Aborted".red().bold(), path.display()));
        }
        if report.allowlist_updated {
            out.push_str("Updated allowed_symlinks.txt\n");
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn format_placement_json(reports: &[PlacementReport]) -> Result<String, ChestError> {
    to_json(reports)
}

pub fn format_break_text(reports: &[BreakReport]) -> String {
    if reports.is_empty() {
        return "No instances to break.".to_string();
    }
    let mut out = String::new();
    for report in reports {
        out.push_str(&format_section_heading(&format!(
            "{}{}",
            report.instance,
            dry_run_suffix(report.dry_run)
        )));
        out.push('\n');

        let rows = report.materialized.len() + report.relinked.len() + report.failed.len();
        if rows > 0 {
            let mut t = table(vec!["Path", "Action", "Detail"]);
            for path in &report.materialized {
                t.add_row(vec![
                    path.display().to_string(),
                    "materialized".green().to_string(),
                    String::new(),
                ]);
            }
            for relinked in &report.relinked {
                t.add_row(vec![
                    relinked.link.display().to_string(),
                    "relinked".cyan().to_string(),
                    format!("-> {}", relinked.target.display()),
                ]);
            }
            for failure in &report.failed {
                t.add_row(vec![
                    failure.path.display().to_string(),
                    "failed".red().to_string(),
                    failure.detail.clone(),
                ]);
            }
            out.push_str(&t.to_string());
            out.push('\n');
        }
        out.push_str(&report.summary());
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

pub fn format_break_json(reports: &[BreakReport]) -> Result<String, ChestError> {
    to_json(reports)
}
