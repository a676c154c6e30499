//! Run input locator.
//!
//! Resolves a simulation run's root (a local directory or a URL) into the
//! locations of the files downstream loaders need.

mod layout;
mod run;

pub use layout::RunLayout;
pub use run::RunDirectory;

use crate::error::Result;
use crate::fetch::HttpClient;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a file lives: on the local filesystem or behind a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(String),
}

impl Location {
    /// Anything containing `://` is treated as a URL.
    pub fn parse(root: &str) -> Self {
        if root.contains("://") {
            Location::Remote(root.trim_end_matches('/').to_string())
        } else {
            Location::Local(PathBuf::from(root))
        }
    }

    /// Appends a `/`-separated relative path.
    pub fn join(&self, relative: &str) -> Location {
        match self {
            Location::Local(base) => {
                let mut path = base.clone();
                for part in relative.split('/').filter(|p| !p.is_empty()) {
                    path.push(part);
                }
                Location::Local(path)
            }
            Location::Remote(base) => {
                Location::Remote(format!("{}/{}", base, relative.trim_start_matches('/')))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }

    pub fn as_local(&self) -> Option<&Path> {
        match self {
            Location::Local(path) => Some(path),
            Location::Remote(_) => None,
        }
    }

    /// Last path segment, used to sniff the delimiter from the extension.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Location::Local(path) => path.file_name().and_then(|n| n.to_str()),
            Location::Remote(url) => url.rsplit('/').next().filter(|n| !n.is_empty()),
        }
    }

    pub fn exists<C: HttpClient + ?Sized>(&self, client: &C) -> Result<bool> {
        match self {
            Location::Local(path) => Ok(path.exists()),
            Location::Remote(url) => client.exists(url),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote(url) => write!(f, "{url}"),
        }
    }
}
