//! Provider driven by shell command templates.
//!
//! Each backend in the catalog becomes one `CommandProvider`. Queries are
//! interpreted as:
//!
//! - exit 0 and the version pattern matches: `Present(version)`
//! - exit 0 and nothing matches: `Absent`
//! - exit code listed in `absent_exit_codes`: `Absent`
//! - anything else: [`ProviderError::CommandFailed`]

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::catalog::schema::BackendConfig;
use crate::error::{ProvisionError, Result};
use crate::shell::{execute_quiet, render, CommandOutput};
use crate::version::VersionSpec;

use super::{InstalledState, PackageProvider, ProviderError, ProviderResult};

/// A package manager reached through shell commands.
#[derive(Debug)]
pub struct CommandProvider {
    config: BackendConfig,
    version_regex: Regex,
    cwd: Option<PathBuf>,
}

impl CommandProvider {
    /// Build a provider from a backend config.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let version_regex = Regex::new(&config.version_pattern).map_err(|e| {
            ProvisionError::CatalogValidationError {
                message: format!(
                    "backend '{}' has an invalid version_pattern: {}",
                    config.name, e
                ),
            }
        })?;

        Ok(Self {
            config,
            version_regex,
            cwd: None,
        })
    }

    /// Run backend commands from this directory.
    pub fn with_cwd(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }

    /// The backend config this provider was built from.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn run(&self, command: &str) -> ProviderResult<CommandOutput> {
        execute_quiet(command, self.cwd.as_deref()).map_err(|e| ProviderError::Unavailable {
            provider: self.config.name.clone(),
            message: e.to_string(),
        })
    }

    fn run_checked(&self, command: &str) -> ProviderResult<()> {
        let output = self.run(command)?;
        if output.success {
            Ok(())
        } else {
            Err(command_failed(command, &output))
        }
    }

    fn extract_version(&self, package: &str, output: &str) -> ProviderResult<Option<VersionSpec>> {
        let Some(caps) = self.version_regex.captures(output) else {
            return Ok(None);
        };
        let matched = caps
            .get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str())
            .unwrap_or_default();

        VersionSpec::parse(matched)
            .map(Some)
            .map_err(|_| ProviderError::UnparseableOutput {
                package: package.to_string(),
                output: matched.to_string(),
            })
    }
}

fn command_failed(command: &str, output: &CommandOutput) -> ProviderError {
    ProviderError::CommandFailed {
        command: command.to_string(),
        code: output.exit_code,
        detail: output.last_error_line().map(String::from),
    }
}

impl PackageProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn probe(&self) -> ProviderResult<()> {
        let Some(probe) = &self.config.probe else {
            return Ok(());
        };
        let output = self.run(probe)?;
        if output.success {
            Ok(())
        } else {
            Err(ProviderError::Unavailable {
                provider: self.config.name.clone(),
                message: command_failed(probe, &output).to_string(),
            })
        }
    }

    fn query(&self, package: &str) -> ProviderResult<InstalledState> {
        let command = render(&self.config.query, &[("name", package)]);
        let output = self.run(&command)?;

        if output.success {
            return Ok(match self.extract_version(package, &output.stdout)? {
                Some(version) => InstalledState::Present(version),
                None => InstalledState::Absent,
            });
        }

        match output.exit_code {
            Some(code) if self.config.absent_exit_codes.contains(&code) => {
                Ok(InstalledState::Absent)
            }
            _ => Err(command_failed(&command, &output)),
        }
    }

    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()> {
        let version = min_version.to_string();
        let command = render(
            &self.config.install,
            &[("name", package), ("version", &version)],
        );
        self.run_checked(&command)
    }

    fn upgrade(&self, package: &str) -> ProviderResult<()> {
        let command = render(&self.config.upgrade, &[("name", package)]);
        self.run_checked(&command)
    }

    fn uninstall(&self, package: &str) -> ProviderResult<()> {
        let command = render(&self.config.uninstall, &[("name", package)]);
        self.run_checked(&command)
    }
}
