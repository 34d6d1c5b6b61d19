//! Installed-state query results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::version::VersionSpec;

/// What a provider reports about one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "version", rename_all = "snake_case")]
pub enum InstalledState {
    /// Not installed.
    Absent,
    /// Installed at the given version.
    Present(VersionSpec),
}

impl InstalledState {
    /// The installed version, if any.
    pub fn version(&self) -> Option<&VersionSpec> {
        match self {
            InstalledState::Absent => None,
            InstalledState::Present(v) => Some(v),
        }
    }

    /// Whether the package is installed.
    pub fn is_present(&self) -> bool {
        matches!(self, InstalledState::Present(_))
    }
}

impl fmt::Display for InstalledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstalledState::Absent => write!(f, "absent"),
            InstalledState::Present(v) => write!(f, "{}", v),
        }
    }
}
