//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ChestError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ChestError) -> String {
    match e {
        ChestError::Config(message) => format!("Configuration error: {}", message),
        ChestError::Aborted(path) => format!(
            "Aborted at {}. Links placed before this point were kept.",
            path.display()
        ),
        ChestError::Conflict { path, detail } => format!(
            "Conflict at {}: {}. Links placed before this point were kept. \
             Re-run with --conflict skip or --conflict overwrite.",
            path.display(),
            detail
        ),
        ChestError::PushIncomplete { report, .. } => {
            let failures: Vec<String> = report
                .outcomes
                .iter()
                .filter_map(|o| o.error.as_ref().map(|error| format!("  {}: {}", o.alias, error)))
                .collect();
            format!("{}:\n{}", e, failures.join("\n"))
        }
        ChestError::NoRemoteSucceeded(_) => {
            format!("{}. See the log for per-remote details.", e)
        }
        ChestError::Interrupted { error, .. } => map_error(error),
        _ => e.to_string(),
    }
}
