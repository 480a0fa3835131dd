//! Interactive prompts: conflict selection and confirmations.

use crate::error::ChestError;
use crate::place::{ConflictResolver, Decision, ExistingState};
use std::path::Path;

/// Asks the operator what to do with each obstruction.
#[derive(Debug, Default)]
pub struct PromptResolver {
    /// Set once the operator picks "for all"
    remembered: Option<Decision>,
}

impl PromptResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

const CHOICES: [&str; 5] = [
    "Overwrite",
    "Skip",
    "Overwrite all remaining",
    "Skip all remaining",
    "Abort",
];

impl ConflictResolver for PromptResolver {
    fn resolve_conflict(
        &mut self,
        path: &Path,
        existing: &ExistingState,
    ) -> Result<Decision, ChestError> {
        if let Some(decision) = self.remembered {
            return Ok(decision);
        }

        use dialoguer::Select;
        let selection = Select::new()
            .with_prompt(format!("{} already exists ({})", path.display(), existing))
            .items(&CHOICES)
            .default(1)
            .interact()
            .map_err(|e| ChestError::Prompt(e.to_string()))?;

        Ok(match selection {
            0 => Decision::Overwrite,
            1 => Decision::Skip,
            2 => {
                self.remembered = Some(Decision::Overwrite);
                Decision::Overwrite
            }
            3 => {
                self.remembered = Some(Decision::Skip);
                Decision::Skip
            }
            _ => Decision::Abort,
        })
    }
}

/// Yes/no confirmation, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool, ChestError> {
    use dialoguer::Confirm;
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ChestError::Prompt(e.to_string()))
}
