//! Replicating the EnderChest folder between machines.

mod driver;
mod file;
mod remote;
mod rsync;
mod transport;

pub use driver::{connect, pull_first, push_all, RemoteOutcome, SyncReport};
pub use file::{mirror, FileTransport};
pub use remote::{Remote, RemoteLocation};
pub use rsync::{parse_itemized, RsyncTransport};
pub use transport::{Change, ChangeKind, Direction, ExcludeSet, Transport};

use crate::error::LinkError;
use thiserror::Error;

/// Default sync exclusions, relative to the chest folder.
pub const DEFAULT_DO_NOT_SYNC: &[&str] = &["enderchest.toml", ".*", ".DS_Store"];

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Unsupported remote URI '{0}'")]
    UnsupportedUri(String),

    #[error("Remote location {0} is not reachable")]
    Unreachable(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Invalid sync exclusion '{pattern}': {message}")]
    Exclude { pattern: String, message: String },

    #[error(transparent)]
    Link(#[from] LinkError),
}
