//! Checks that Earthdata login credentials are available before a run.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Reports whether the credentials a run depends on are present.
pub trait CredentialPresence {
    fn is_present(&self) -> bool;
}

/// Looks for `.netrc` (`_netrc` on Windows) in a home directory.
#[derive(Debug, Clone)]
pub struct Netrc {
    home: Option<PathBuf>,
}

impl Netrc {
    /// The current user's home directory.
    pub fn from_home() -> Self {
        Netrc {
            home: dirs::home_dir(),
        }
    }

    pub fn in_dir(home: impl Into<PathBuf>) -> Self {
        Netrc {
            home: Some(home.into()),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.home.as_deref().map(|home| home.join(netrc_file_name()))
    }
}

impl CredentialPresence for Netrc {
    fn is_present(&self) -> bool {
        match self.path() {
            Some(path) if Path::exists(&path) => {
                info!(path = %path.display(), ".netrc file found");
                true
            }
            _ => {
                warn!(".netrc file not found. Earthdata authentication will fail");
                false
            }
        }
    }
}

pub fn netrc_file_name() -> &'static str {
    if cfg!(windows) {
        "_netrc"
    } else {
        ".netrc"
    }
}

// -- Tests -------------------------------------------------------------------
