//! Error types for EnderChest.

use crate::sync::SyncReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem-level errors raised while walking, linking, or copying.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Symlink cycle detected at {0}")]
    Cycle(PathBuf),

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl LinkError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LinkError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Top-level errors surfaced by every public EnderChest operation.
#[derive(Debug, Error)]
pub enum ChestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict at {path}: {detail}")]
    Conflict { path: PathBuf, detail: String },

    #[error("Placement aborted at {0}")]
    Aborted(PathBuf),

    #[error("Transport to {remote} failed: {message}")]
    Transport { remote: String, message: String },

    #[error("Could not pull from any remote ({0} tried)")]
    NoRemoteSucceeded(usize),

    #[error("Push failed for {failed} of {attempted} remotes")]
    PushIncomplete {
        failed: usize,
        attempted: usize,
        /// Every attempted remote, failures included
        report: Box<SyncReport>,
    },

    #[error("Failed to get user input: {0}")]
    Prompt(String),

    #[error("Failed to render output: {0}")]
    Render(String),

    #[error("Filesystem error: {0}")]
    Link(#[from] LinkError),

    /// A command stopped early; `output` renders what it did before stopping
    #[error("{error}")]
    Interrupted {
        output: String,
        #[source]
        error: Box<ChestError>,
    },
}

impl From<config::ConfigError> for ChestError {
    fn from(err: config::ConfigError) -> Self {
        ChestError::Config(err.to_string())
    }
}
