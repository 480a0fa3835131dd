//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_box_json, format_box_text, format_break_json, format_break_text,
    format_instance_json, format_instance_text, format_inventory_json, format_inventory_text,
    format_placement_json, format_placement_text, format_sync_json, format_sync_text,
};
use crate::cli::prompt::{confirm, PromptResolver};
use crate::cli::{command_name, is_mutating};
use crate::config::ConfigLoader;
use crate::error::ChestError;
use crate::inventory::{BoxSummary, Inventory};
use crate::orchestrate::{self, PlaceRequest};
use crate::place::{ConflictPolicy, ConflictResolver, PolicyResolver};
use crate::sync::SyncReport;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: the minecraft root and the inventory built
/// from it. Built using ConfigLoader only.
pub struct RunContext {
    minecraft_root: PathBuf,
    config_path: Option<PathBuf>,
    inventory: Inventory,
    interactive: bool,
}

impl RunContext {
    /// Create run context from the minecraft root and optional config path.
    pub fn new(minecraft_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ChestError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&minecraft_root)?
        };
        let inventory = Inventory::from_config(&minecraft_root, &config)?;

        Ok(Self {
            minecraft_root,
            config_path,
            inventory,
            interactive: std::io::stdin().is_terminal(),
        })
    }

    /// Force interactive prompting on or off (off makes `prompt` behave as `skip`).
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ChestError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(
            command = %name,
            root = %self.minecraft_root.display(),
            config = ?self.config_path,
            mutating = is_mutating(command),
            "Executing command"
        );
        let result = self.execute_inner(command);
        info!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ChestError> {
        match command {
            Commands::Place {
                dry_run,
                conflict,
                absolute,
                keep_broken_links,
                instance,
                format,
            } => self.handle_place(
                *dry_run,
                conflict.as_deref(),
                *absolute,
                *keep_broken_links,
                instance,
                format,
            ),
            Commands::Break {
                dry_run,
                yes,
                format,
            } => self.handle_break(*dry_run, *yes, format),
            Commands::Inventory {
                instance,
                shulker_box,
                format,
            } => self.handle_inventory(instance.as_deref(), shulker_box.as_deref(), format),
            Commands::Push {
                dry_run,
                yes,
                format,
            } => self.handle_sync(*dry_run, *yes, format, "push", orchestrate::push),
            Commands::Pull {
                dry_run,
                yes,
                format,
            } => self.handle_sync(*dry_run, *yes, format, "pull", orchestrate::pull),
        }
    }

    fn conflict_policy(&self, conflict: Option<&str>) -> Result<ConflictPolicy, ChestError> {
        match conflict {
            Some(value) => value.parse::<ConflictPolicy>(),
            None => Ok(self.inventory.settings.conflict_policy),
        }
    }

    fn conflict_resolver(&self, policy: ConflictPolicy) -> Box<dyn ConflictResolver> {
        if policy == ConflictPolicy::Prompt && self.interactive {
            Box::new(PromptResolver::new())
        } else {
            Box::new(PolicyResolver::new(policy))
        }
    }

    fn handle_place(
        &self,
        dry_run: bool,
        conflict: Option<&str>,
        absolute: bool,
        keep_broken_links: bool,
        instances: &[String],
        format: &str,
    ) -> Result<String, ChestError> {
        let policy = self.conflict_policy(conflict)?;
        let mut resolver = self.conflict_resolver(policy);
        let request = PlaceRequest {
            dry_run,
            absolute,
            instances: instances.to_vec(),
            keep_broken_links,
        };
        let reports = orchestrate::place_all(&self.inventory, &request, resolver.as_mut())?;
        let output = if format == "json" {
            format_placement_json(&reports)?
        } else {
            format_placement_text(&reports, &self.inventory.chest_root)
        };

        if let Some(path) = reports.iter().find_map(|r| r.aborted_at.clone()) {
            // A non-interactive abort came from the policy, not the operator
            let error = if policy == ConflictPolicy::Fail {
                ChestError::Conflict {
                    path,
                    detail: "target is occupied and the conflict policy is fail".to_string(),
                }
            } else {
                ChestError::Aborted(path)
            };
            return Err(ChestError::Interrupted {
                output,
                error: Box::new(error),
            });
        }
        Ok(output)
    }

    fn handle_break(&self, dry_run: bool, yes: bool, format: &str) -> Result<String, ChestError> {
        if !dry_run && !yes {
            let prompt = format!(
                "Replace every link into {} with a copy of its contents?",
                self.inventory.chest_root.display()
            );
            if !confirm(&prompt)? {
                return Ok("Break cancelled".to_string());
            }
        }
        let reports = orchestrate::break_all(&self.inventory, dry_run)?;
        if format == "json" {
            format_break_json(&reports)
        } else {
            Ok(format_break_text(&reports))
        }
    }

    fn handle_inventory(
        &self,
        instance: Option<&str>,
        shulker_box: Option<&str>,
        format: &str,
    ) -> Result<String, ChestError> {
        let json = format == "json";
        match (instance, shulker_box) {
            (Some(name), _) => {
                let found = self.inventory.instance(name)?;
                let boxes = self.inventory.boxes_for_instance(name)?;
                let plan = self.inventory.plan_for_instance(name)?;
                if json {
                    format_instance_json(found, &boxes, &plan)
                } else {
                    Ok(format_instance_text(found, &boxes, &plan))
                }
            }
            (None, Some(name)) => {
                let summary = BoxSummary::from(self.inventory.shulker_box(name)?);
                let instances = self.inventory.instances_for_box(name)?;
                if json {
                    format_box_json(&summary, &instances)
                } else {
                    Ok(format_box_text(&summary, &instances))
                }
            }
            (None, None) => {
                if json {
                    format_inventory_json(&self.inventory)
                } else {
                    Ok(format_inventory_text(&self.inventory))
                }
            }
        }
    }

    /// Without `--yes`, a real transfer is preceded by a dry-run preview on stderr and a
    /// confirmation.
    fn handle_sync(
        &self,
        dry_run: bool,
        yes: bool,
        format: &str,
        verb: &str,
        run: fn(&Inventory, bool) -> Result<SyncReport, ChestError>,
    ) -> Result<String, ChestError> {
        let render = |report: &SyncReport| {
            if format == "json" {
                format_sync_json(report)
            } else {
                Ok(format_sync_text(report))
            }
        };

        // A push that reached only some remotes still renders what each one did
        let finish = |result: Result<SyncReport, ChestError>| match result {
            Ok(report) => render(&report),
            Err(ChestError::PushIncomplete {
                failed,
                attempted,
                report,
            }) => Err(ChestError::Interrupted {
                output: render(report.as_ref())?,
                error: Box::new(ChestError::PushIncomplete {
                    failed,
                    attempted,
                    report,
                }),
            }),
            Err(e) => Err(e),
        };

        if dry_run {
            return finish(run(&self.inventory, true));
        }
        if !yes {
            let preview = match run(&self.inventory, true) {
                Ok(report) => report,
                Err(ChestError::PushIncomplete { report, .. }) => *report,
                Err(e) => return Err(e),
            };
            eprintln!("{}", format_sync_text(&preview));
            if !confirm(&format!("Proceed with {}?", verb))? {
                return Ok(format!("{} cancelled", verb));
            }
        }
        finish(run(&self.inventory, false))
    }
}
