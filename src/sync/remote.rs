//! Remote EnderChest locations.

use super::TransportError;
use crate::tree::path::expand_home;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a remote lives. The location always names the remote's minecraft root; its
/// `EnderChest` folder sits directly inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RemoteLocation {
    /// A folder on this machine (or a mounted share)
    Local { path: PathBuf },
    /// An rsync target, either over ssh (`user@host:path`) or an rsync daemon
    Rsync {
        user: Option<String>,
        host: String,
        path: String,
        daemon: bool,
    },
}

impl RemoteLocation {
    /// Parse a remote URI: `file:///path`, a bare path, `rsync://[user@]host/path`, or
    /// `[user@]host:path`.
    pub fn parse(uri: &str) -> Result<Self, TransportError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(TransportError::UnsupportedUri(uri.to_string()));
        }

        if let Some(rest) = uri.strip_prefix("file://") {
            let path = match rest.strip_prefix("localhost") {
                Some(stripped) => stripped,
                None => rest,
            };
            if !path.starts_with('/') {
                return Err(TransportError::UnsupportedUri(uri.to_string()));
            }
            return Ok(RemoteLocation::Local {
                path: PathBuf::from(path),
            });
        }

        if let Some(rest) = uri.strip_prefix("rsync://") {
            let (authority, path) = rest
                .split_once('/')
                .ok_or_else(|| TransportError::UnsupportedUri(uri.to_string()))?;
            let (user, host) = split_user(authority);
            if host.is_empty() {
                return Err(TransportError::UnsupportedUri(uri.to_string()));
            }
            return Ok(RemoteLocation::Rsync {
                user,
                host: host.to_string(),
                path: format!("/{}", path),
                daemon: true,
            });
        }

        if uri.contains("://") {
            return Err(TransportError::UnsupportedUri(uri.to_string()));
        }

        if let Some((authority, path)) = ssh_spec(uri) {
            let (user, host) = split_user(authority);
            return Ok(RemoteLocation::Rsync {
                user,
                host: host.to_string(),
                path: path.to_string(),
                daemon: false,
            });
        }

        Ok(RemoteLocation::Local {
            path: expand_home(Path::new(uri)),
        })
    }
}

/// `[user@]host:path`, but not a Windows drive letter like `C:\`.
fn ssh_spec(uri: &str) -> Option<(&str, &str)> {
    let (authority, path) = uri.split_once(':')?;
    if authority.is_empty()
        || authority.contains('/')
        || authority.contains('\\')
        || (authority.len() == 1 && authority.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return None;
    }
    Some((authority, path))
}

fn split_user(authority: &str) -> (Option<String>, &str) {
    match authority.split_once('@') {
        Some((user, host)) => (Some(user.to_string()), host),
        None => (None, authority),
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteLocation::Local { path } => write!(f, "{}", path.display()),
            RemoteLocation::Rsync {
                user,
                host,
                path,
                daemon,
            } => {
                let user = user.as_deref().map(|u| format!("{}@", u)).unwrap_or_default();
                if *daemon {
                    write!(f, "rsync://{}{}{}", user, host, path)
                } else {
                    write!(f, "{}{}:{}", user, host, path)
                }
            }
        }
    }
}

/// A configured remote, in the order it was listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub alias: String,
    pub uri: String,
    pub location: RemoteLocation,
}

impl Remote {
    pub fn parse(uri: &str, alias: Option<&str>) -> Result<Self, TransportError> {
        let location = RemoteLocation::parse(uri)?;
        let alias = match alias {
            Some(alias) if !alias.trim().is_empty() => alias.trim().to_string(),
            _ => match &location {
                RemoteLocation::Rsync { host, .. } => host.clone(),
                RemoteLocation::Local { .. } => uri.trim().to_string(),
            },
        };
        Ok(Self {
            alias,
            uri: uri.trim().to_string(),
            location,
        })
    }
}
