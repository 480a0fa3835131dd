//! rsync transport. Requires an `rsync` executable on the PATH and, for ssh remotes,
//! key-based authentication.

use super::remote::RemoteLocation;
use super::transport::{Change, ChangeKind, Transport};
use super::TransportError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct RsyncTransport {
    location: RemoteLocation,
    program: PathBuf,
}

impl RsyncTransport {
    pub fn new(location: RemoteLocation) -> Self {
        Self {
            location,
            program: PathBuf::from("rsync"),
        }
    }

    /// Use a specific rsync binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// The remote chest folder, with a trailing slash so rsync copies its contents.
    fn remote_chest(&self, chest: &Path) -> String {
        let name = chest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let base = self.location.to_string();
        format!("{}/{}/", base.trim_end_matches('/'), name)
    }

    /// Argument list for one transfer, without the program name.
    pub fn arguments(
        &self,
        source: &str,
        destination: &str,
        excludes: &[String],
        dry_run: bool,
    ) -> Vec<String> {
        let mut args = vec![
            "--archive".to_string(),
            "--compress".to_string(),
            "--protect-args".to_string(),
            "--itemize-changes".to_string(),
            "--delete".to_string(),
        ];
        if dry_run {
            args.push("--dry-run".to_string());
        }
        for pattern in excludes {
            args.push("--exclude".to_string());
            // Anchor path patterns at the transfer root, like the local mirror does.
            if pattern.contains('/') && !pattern.starts_with('/') {
                args.push(format!("/{}", pattern));
            } else {
                args.push(pattern.clone());
            }
        }
        args.push(source.to_string());
        args.push(destination.to_string());
        args
    }

    fn run(&self, args: Vec<String>, dry_run: bool) -> Result<Vec<Change>, TransportError> {
        let program = self.program.display().to_string();
        if dry_run {
            info!(command = %format!("{} {}", program, args.join(" ")), "Previewing rsync transfer");
        } else {
            debug!(command = %format!("{} {}", program, args.join(" ")), "Running rsync");
        }

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| TransportError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TransportError::CommandFailed {
                program,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_itemized(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Transport for RsyncTransport {
    fn push(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError> {
        let source = format!("{}/", chest.display().to_string().trim_end_matches('/'));
        let args = self.arguments(&source, &self.remote_chest(chest), excludes, dry_run);
        self.run(args, dry_run)
    }

    fn pull(
        &self,
        chest: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<Vec<Change>, TransportError> {
        let destination = format!("{}/", chest.display().to_string().trim_end_matches('/'));
        let args = self.arguments(&self.remote_chest(chest), &destination, excludes, dry_run);
        self.run(args, dry_run)
    }
}

/// Parse `--itemize-changes` output into changes. Lines that describe no transfer
/// (attribute-only updates of the root, informational messages) are dropped.
pub fn parse_itemized(stdout: &str) -> Vec<Change> {
    let mut changes = Vec::new();
    for line in stdout.lines() {
        if let Some(path) = line.strip_prefix("*deleting") {
            let path = path.trim().trim_end_matches('/');
            if !path.is_empty() {
                changes.push(Change::new(ChangeKind::Delete, path));
            }
            continue;
        }

        let Some((flags, path)) = line.split_once(' ') else {
            continue;
        };
        let mut chars = flags.chars();
        let (Some(update), Some(file_type)) = (chars.next(), chars.next()) else {
            continue;
        };
        if flags.len() != 11
            || !"<>ch.".contains(update)
            || !"fdLDS".contains(file_type)
        {
            continue;
        }

        let attributes = &flags[2..];
        let kind = if attributes.chars().all(|c| c == '+') {
            ChangeKind::Create
        } else if update == '.' && attributes.chars().all(|c| c == '.' || c == ' ') {
            continue;
        } else {
            ChangeKind::Update
        };

        let path = path.trim();
        let path = path.split(" -> ").next().unwrap_or(path).trim_end_matches('/');
        if path.is_empty() || path == "." {
            continue;
        }
        changes.push(Change::new(kind, path));
    }
    changes
}
