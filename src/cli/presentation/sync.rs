use super::shared::{dry_run_suffix, format_section_heading, table, to_json};
use crate::error::ChestError;
use crate::sync::{ChangeKind, Direction, SyncReport};
use owo_colors::OwoColorize;

pub fn format_sync_text(report: &SyncReport) -> String {
    let verb = match report.direction {
        Direction::Push => "Push",
        Direction::Pull => "Pull",
    };
    let mut out = format!(
        "{}\n",
        format_section_heading(&format!("{}{}", verb, dry_run_suffix(report.dry_run)))
    );
    if report.outcomes.is_empty() {
        out.push_str("No remotes configured.");
        return out;
    }

    for outcome in &report.outcomes {
        match &outcome.error {
            Some(error) => out.push_str(&format!(
                "{} {} ({}): {}\n",
                "✗".red(),
                outcome.alias,
                outcome.uri,
                error
            )),
            None => out.push_str(&format!(
                "{} {} ({}): {} change(s)\n",
                "✓".green(),
                outcome.alias,
                outcome.uri,
                outcome.changes.len()
            )),
        }
        if !outcome.changes.is_empty() {
            let mut t = table(vec!["Change", "Path"]);
            for change in &outcome.changes {
                let kind = match change.kind {
                    ChangeKind::Create => "create".green().to_string(),
                    ChangeKind::Update => "update".yellow().to_string(),
                    ChangeKind::Delete => "delete".red().to_string(),
                };
                t.add_row(vec![kind, change.path.display().to_string()]);
            }
            out.push_str(&format!("{}\n", t));
        }
    }
    out.trim_end().to_string()
}

pub fn format_sync_json(report: &SyncReport) -> Result<String, ChestError> {
    to_json(report)
}
