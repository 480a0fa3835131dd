//! Remote ordering: push to every remote, pull from the first that works.

use super::remote::{Remote, RemoteLocation};
use super::transport::{Change, Direction, Transport};
use super::{FileTransport, RsyncTransport, TransportError};
use crate::error::ChestError;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// What happened with one remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteOutcome {
    pub alias: String,
    pub uri: String,
    pub changes: Vec<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub direction: Direction,
    pub dry_run: bool,
    /// One entry per attempted remote, in attempt order
    pub outcomes: Vec<RemoteOutcome>,
}

/// Pick the transport for a remote.
pub fn connect(remote: &Remote) -> Result<Box<dyn Transport>, TransportError> {
    Ok(match &remote.location {
        RemoteLocation::Local { path } => Box::new(FileTransport::new(path.clone())),
        location @ RemoteLocation::Rsync { .. } => Box::new(RsyncTransport::new(location.clone())),
    })
}

fn attempt<F>(
    remote: &Remote,
    connect: &mut F,
    direction: Direction,
    chest: &Path,
    excludes: &[String],
    dry_run: bool,
) -> RemoteOutcome
where
    F: FnMut(&Remote) -> Result<Box<dyn Transport>, TransportError>,
{
    let result = connect(remote).and_then(|transport| match direction {
        Direction::Push => transport.push(chest, excludes, dry_run),
        Direction::Pull => transport.pull(chest, excludes, dry_run),
    });
    match result {
        Ok(changes) => {
            info!(remote = %remote.alias, ?direction, changes = changes.len(), dry_run, "Sync succeeded");
            RemoteOutcome {
                alias: remote.alias.clone(),
                uri: remote.uri.clone(),
                changes,
                error: None,
            }
        }
        Err(e) => {
            warn!(remote = %remote.alias, ?direction, error = %e, "Sync failed");
            RemoteOutcome {
                alias: remote.alias.clone(),
                uri: remote.uri.clone(),
                changes: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Push the chest to every remote in listed order, regardless of earlier failures.
///
/// Returns the full report when every remote succeeded; otherwise
/// `ChestError::PushIncomplete` once all remotes have been attempted.
pub fn push_all<F>(
    remotes: &[Remote],
    mut connect: F,
    chest: &Path,
    excludes: &[String],
    dry_run: bool,
) -> Result<SyncReport, ChestError>
where
    F: FnMut(&Remote) -> Result<Box<dyn Transport>, TransportError>,
{
    if remotes.is_empty() {
        warn!("No remotes configured; nothing to push");
    }
    let outcomes: Vec<RemoteOutcome> = remotes
        .iter()
        .map(|remote| attempt(remote, &mut connect, Direction::Push, chest, excludes, dry_run))
        .collect();

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    let report = SyncReport {
        direction: Direction::Push,
        dry_run,
        outcomes,
    };
    if failed > 0 {
        return Err(ChestError::PushIncomplete {
            failed,
            attempted: report.outcomes.len(),
            report: Box::new(report),
        });
    }
    Ok(report)
}

/// Pull the chest from the first remote, in listed order, that syncs successfully.
/// Later remotes are not contacted.
pub fn pull_first<F>(
    remotes: &[Remote],
    mut connect: F,
    chest: &Path,
    excludes: &[String],
    dry_run: bool,
) -> Result<SyncReport, ChestError>
where
    F: FnMut(&Remote) -> Result<Box<dyn Transport>, TransportError>,
{
    let mut outcomes = Vec::new();
    for remote in remotes {
        let outcome = attempt(remote, &mut connect, Direction::Pull, chest, excludes, dry_run);
        let succeeded = outcome.succeeded();
        outcomes.push(outcome);
        if succeeded {
            return Ok(SyncReport {
                direction: Direction::Pull,
                dry_run,
                outcomes,
            });
        }
    }
    Err(ChestError::NoRemoteSucceeded(outcomes.len()))
}
