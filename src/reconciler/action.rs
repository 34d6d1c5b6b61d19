//! Deciding what to do with one catalog entry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::provider::InstalledState;
use crate::version::VersionSpec;

/// The action chosen for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Not installed; install at the minimum version or newer.
    Install,
    /// Installed below the minimum; upgrade in place.
    Upgrade,
    /// Installed and forced; uninstall, then install.
    Reinstall,
    /// Installed at or above the minimum; nothing to do.
    Skip,
}

impl Action {
    /// Whether carrying out this action changes installed state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::Skip)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Install => "install",
            Action::Upgrade => "upgrade",
            Action::Reinstall => "reinstall",
            Action::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// Pick the action for an entry from its installed state.
///
/// `Absent` always installs. With `force_reinstall`, anything present is
/// reinstalled. Otherwise the minimum is inclusive: equal versions skip.
pub fn decide(state: &InstalledState, min_version: &VersionSpec, force_reinstall: bool) -> Action {
    match state {
        InstalledState::Absent => Action::Install,
        InstalledState::Present(_) if force_reinstall => Action::Reinstall,
        InstalledState::Present(v) if v < min_version => Action::Upgrade,
        InstalledState::Present(_) => Action::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionSpec {
        VersionSpec::parse(s).unwrap()
    }

    fn present(s: &str) -> InstalledState {
        InstalledState::Present(v(s))
    }

    #[test]
    fn absent_installs() {
        assert_eq!(decide(&InstalledState::Absent, &v("1.0"), false), Action::Install);
        assert_eq!(decide(&InstalledState::Absent, &v("1.0"), true), Action::Install);
    }

    #[test]
    fn older_upgrades() {
        assert_eq!(decide(&present("1.5"), &v("2.0"), false), Action::Upgrade);
        assert_eq!(decide(&present("1.9.9"), &v("1.10"), false), Action::Upgrade);
    }

    #[test]
    fn equal_or_newer_skips() {
        assert_eq!(decide(&present("2.0"), &v("2.0.0"), false), Action::Skip);
        assert_eq!(decide(&present("2.1"), &v("2.0"), false), Action::Skip);
    }

    #[test]
    fn force_reinstalls_anything_present() {
        assert_eq!(decide(&present("2.1"), &v("2.0"), true), Action::Reinstall);
        assert_eq!(decide(&present("1.0"), &v("2.0"), true), Action::Reinstall);
    }

    #[test]
    fn only_skip_is_read_only() {
        assert!(!Action::Skip.is_mutating());
        assert!(Action::Install.is_mutating());
        assert!(Action::Upgrade.is_mutating());
        assert!(Action::Reinstall.is_mutating());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Action::Reinstall.to_string(), "reinstall");
    }
}
