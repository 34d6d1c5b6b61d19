//! Catalog schema definitions.
//!
//! This module contains the structs that map to the YAML catalog file
//! format. Minimum versions are parsed on load; regex patterns are kept as
//! written and checked by [`validator`](super::validator).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::VersionSpec;

/// Default regex used to pull a version out of query output.
pub const DEFAULT_VERSION_PATTERN: &str = r"(\d+(?:\.\d+)+)";

/// Root structure of `catalog.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CatalogConfig {
    /// Display name for headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Global settings
    pub settings: Settings,

    /// Environment setup commands run before reconciliation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<SetupStep>,

    /// Package manager backends, tried in order
    pub backends: Vec<BackendConfig>,

    /// Desired packages and their minimum versions
    pub packages: Vec<PackageConfig>,
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, normal, quiet, silent
    pub default_output: OutputMode,

    /// Total attempts for install, upgrade and uninstall calls
    pub retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_output: OutputMode::Normal,
            retries: 1,
            retry_delay_ms: 0,
        }
    }
}

/// Output verbosity in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// One environment setup command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SetupStep {
    /// Name shown in output and errors
    pub name: String,

    /// Shell command to run
    pub command: String,
}

/// Shell command templates for one package manager backend.
///
/// Templates may use `{name}` (package name) and, for `install`,
/// `{version}` (minimum version).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackendConfig {
    /// Backend name for logs
    pub name: String,

    /// Command whose success means the backend is usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,

    /// Prints the installed version, or exits with an absent code
    pub query: String,

    /// Installs `{name}` at `{version}` or newer
    pub install: String,

    /// Upgrades `{name}` to the newest version
    pub upgrade: String,

    /// Removes `{name}`
    pub uninstall: String,

    /// Regex whose first capture group is the installed version
    #[serde(default = "default_version_pattern")]
    pub version_pattern: String,

    /// Query exit codes that mean "not installed"
    #[serde(default = "default_absent_exit_codes")]
    pub absent_exit_codes: Vec<i32>,
}

fn default_version_pattern() -> String {
    DEFAULT_VERSION_PATTERN.to_string()
}

fn default_absent_exit_codes() -> Vec<i32> {
    vec![1]
}

/// A desired package.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PackageConfig {
    /// Package identifier as the backends know it
    pub name: String,

    /// Inclusive minimum version, dotted numeric
    #[schemars(with = "String")]
    pub min_version: VersionSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_catalog() {
        let yaml = r#"
backends:
  - name: apt
    query: "dpkg-query -W {name}"
    install: "apt-get install -y {name}"
    upgrade: "apt-get install --only-upgrade -y {name}"
    uninstall: "apt-get remove -y {name}"
packages:
  - name: git
    min_version: "2.30"
"#;
        let config: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backends.len(), 1);
        assert_eq!(config.backends[0].version_pattern, DEFAULT_VERSION_PATTERN);
        assert_eq!(config.backends[0].absent_exit_codes, vec![1]);
        assert!(config.backends[0].probe.is_none());
        assert_eq!(config.packages[0].min_version.to_string(), "2.30");
        assert_eq!(config.settings.retries, 1);
        assert_eq!(config.settings.default_output, OutputMode::Normal);
    }

    #[test]
    fn integer_versions_are_accepted() {
        let config: CatalogConfig =
            serde_yaml::from_str("packages:\n  - name: node\n    min_version: 20\n").unwrap();
        assert_eq!(config.packages[0].min_version.components(), &[20]);
    }

    #[test]
    fn float_versions_are_rejected() {
        let err = serde_yaml::from_str::<CatalogConfig>(
            "packages:\n  - name: node\n    min_version: 1.10\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("quote it"));
    }

    #[test]
    fn malformed_versions_fail_to_parse() {
        let err = serde_yaml::from_str::<CatalogConfig>(
            "packages:\n  - name: git\n    min_version: \"2.x\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("2.x"));
    }

    #[test]
    fn settings_parse() {
        let yaml = r#"
settings:
  default_output: quiet
  retries: 3
  retry_delay_ms: 250
setup:
  - name: refresh
    command: apt-get update
"#;
        let config: CatalogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.default_output, OutputMode::Quiet);
        assert_eq!(config.settings.retries, 3);
        assert_eq!(config.settings.retry_delay_ms, 250);
        assert_eq!(config.setup[0].name, "refresh");
    }

    #[test]
    fn empty_document_is_default() {
        let config: CatalogConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.packages.is_empty());
        assert!(config.backends.is_empty());
    }
}
