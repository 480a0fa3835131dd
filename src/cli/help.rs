//! CLI help and command-name contract for logging spans.

use crate::cli::parse::Commands;

/// Command name string for log events (e.g. "place", "inventory.instance").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Place { .. } => "place".to_string(),
        Commands::Break { .. } => "break".to_string(),
        Commands::Inventory {
            instance,
            shulker_box,
            ..
        } => match (instance, shulker_box) {
            (Some(_), _) => "inventory.instance".to_string(),
            (None, Some(_)) => "inventory.box".to_string(),
            (None, None) => "inventory".to_string(),
        },
        Commands::Push { .. } => "push".to_string(),
        Commands::Pull { .. } => "pull".to_string(),
    }
}

/// Whether a command may change files on disk or on a remote.
pub fn is_mutating(command: &Commands) -> bool {
    match command {
        Commands::Place { dry_run, .. }
        | Commands::Break { dry_run, .. }
        | Commands::Push { dry_run, .. }
        | Commands::Pull { dry_run, .. } => !dry_run,
        Commands::Inventory { .. } => false,
    }
}
