//! Registered game installations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Which side of the game an instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub fn from_server_flag(server: bool) -> Self {
        if server {
            Side::Server
        } else {
            Side::Client
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered instance. Read-only to every core component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    /// Absolute path to the instance's data directory (its `.minecraft` folder)
    pub root: PathBuf,
    pub tags: BTreeSet<String>,
    pub minecraft_version: String,
    pub loader: String,
    pub side: Side,
}

impl Instance {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            tags: BTreeSet::new(),
            minecraft_version: String::new(),
            loader: "vanilla".to_string(),
            side: Side::Client,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.minecraft_version = version.into();
        self
    }

    pub fn with_loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = loader.into();
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn is_server(&self) -> bool {
        self.side == Side::Server
    }
}

/// Whether this game version reads `allowed_symlinks.txt` before following links.
///
/// Releases from 1.20 on and weekly snapshots from 23w17a on.
pub fn needs_symlink_allowlist(version: &str) -> bool {
    let version = version.trim();
    if let Some((year, rest)) = version.split_once('w') {
        let (Ok(year), Some(week)) = (year.parse::<u32>(), leading_number(rest)) else {
            return false;
        };
        return (year, week) >= (23, 17);
    }

    let release = version.split('-').next().unwrap_or_default();
    let mut parts = release.split('.');
    let (Some(major), Some(minor)) = (
        parts.next().and_then(|p| p.parse::<u32>().ok()),
        parts.next().and_then(|p| p.parse::<u32>().ok()),
    ) else {
        return false;
    };
    (major, minor) >= (1, 20)
}

/// Normalize a loader identifier for comparison: "Fabric Loader" and "fabric" agree.
pub fn normalize_loader(loader: &str) -> String {
    let lowered = loader.trim().to_lowercase();
    let stripped = lowered.strip_suffix(" loader").unwrap_or(&lowered).trim();
    if stripped.is_empty() {
        "vanilla".to_string()
    } else {
        stripped.to_string()
    }
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
