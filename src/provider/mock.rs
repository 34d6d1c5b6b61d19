//! Scriptable in-memory provider for testing.
//!
//! `MockProvider` keeps an installed-package table and records every call
//! it receives. Failures and misbehaviour are scripted per package.
//! Clones share state, so a test can hand one clone to the code under test
//! and inspect the other afterwards.
//!
//! # Example
//!
//! ```
//! use provisioner::provider::{InstalledState, MockCall, MockProvider, PackageProvider};
//!
//! let provider = MockProvider::new().with_installed("git", "2.40");
//! assert!(provider.query("git").unwrap().is_present());
//! assert_eq!(provider.query("node").unwrap(), InstalledState::Absent);
//! assert_eq!(provider.calls().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::version::VersionSpec;

use super::{InstalledState, PackageProvider, ProviderError, ProviderResult};

/// A call received by a [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Query(String),
    Install(String, VersionSpec),
    Upgrade(String),
    Uninstall(String),
}

impl MockCall {
    /// The package this call was about.
    pub fn package(&self) -> &str {
        match self {
            MockCall::Query(p)
            | MockCall::Install(p, _)
            | MockCall::Upgrade(p)
            | MockCall::Uninstall(p) => p,
        }
    }

    /// Whether this call changes installed state.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, MockCall::Query(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    Query,
    Install,
    Upgrade,
    Uninstall,
}

#[derive(Debug, Default)]
struct MockState {
    installed: HashMap<String, VersionSpec>,
    latest: HashMap<String, VersionSpec>,
    /// Remaining scripted failures; `None` fails forever.
    failures: HashMap<(Op, String), Option<u32>>,
    lying_installs: HashSet<String>,
    unavailable: bool,
    calls: Vec<MockCall>,
}

/// In-memory package provider with scripted behaviour.
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    state: Rc<RefCell<MockState>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create an empty provider named `mock`.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create an empty provider with a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    /// Mark a package as installed at `version`.
    ///
    /// # Panics
    ///
    /// Panics if `version` does not parse.
    pub fn with_installed(self, package: &str, version: &str) -> Self {
        self.state
            .borrow_mut()
            .installed
            .insert(package.to_string(), parse(version));
        self
    }

    /// Version that `install` and `upgrade` produce for a package.
    ///
    /// Without this, `install` produces the requested minimum and
    /// `upgrade` leaves the version unchanged.
    pub fn with_latest(self, package: &str, version: &str) -> Self {
        self.state
            .borrow_mut()
            .latest
            .insert(package.to_string(), parse(version));
        self
    }

    /// Make every `query` for a package fail.
    pub fn fail_query(self, package: &str) -> Self {
        self.script_failure(Op::Query, package, None)
    }

    /// Make every `install` for a package fail.
    pub fn fail_install(self, package: &str) -> Self {
        self.script_failure(Op::Install, package, None)
    }

    /// Make the next `times` installs for a package fail.
    pub fn fail_install_times(self, package: &str, times: u32) -> Self {
        self.script_failure(Op::Install, package, Some(times))
    }

    /// Make every `upgrade` for a package fail.
    pub fn fail_upgrade(self, package: &str) -> Self {
        self.script_failure(Op::Upgrade, package, None)
    }

    /// Make every `uninstall` for a package fail.
    pub fn fail_uninstall(self, package: &str) -> Self {
        self.script_failure(Op::Uninstall, package, None)
    }

    /// Make the next `times` uninstalls for a package fail.
    pub fn fail_uninstall_times(self, package: &str, times: u32) -> Self {
        self.script_failure(Op::Uninstall, package, Some(times))
    }

    /// Make `install` report success without installing anything.
    pub fn lie_on_install(self, package: &str) -> Self {
        self.state
            .borrow_mut()
            .lying_installs
            .insert(package.to_string());
        self
    }

    /// Make `probe` fail.
    pub fn unavailable(self) -> Self {
        self.state.borrow_mut().unavailable = true;
        self
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    /// Calls that change installed state, in order.
    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    /// Calls received for one package, in order.
    pub fn calls_for(&self, package: &str) -> Vec<MockCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.package() == package)
            .cloned()
            .collect()
    }

    /// Currently installed version of a package.
    pub fn installed(&self, package: &str) -> Option<VersionSpec> {
        self.state.borrow().installed.get(package).cloned()
    }

    fn script_failure(self, op: Op, package: &str, times: Option<u32>) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert((op, package.to_string()), times);
        self
    }

    /// Consume one scripted failure, if any.
    fn take_failure(&self, op: Op, package: &str) -> ProviderResult<()> {
        let mut state = self.state.borrow_mut();
        let key = (op, package.to_string());
        let fail = match state.failures.get_mut(&key) {
            None => false,
            Some(None) => true,
            Some(Some(0)) => false,
            Some(Some(remaining)) => {
                *remaining -= 1;
                true
            }
        };

        if fail {
            Err(ProviderError::Other(format!(
                "{} {:?} failed for '{}'",
                self.name, op, package
            )))
        } else {
            Ok(())
        }
    }

    fn record(&self, call: MockCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn parse(version: &str) -> VersionSpec {
    VersionSpec::parse(version)
        .unwrap_or_else(|e| panic!("invalid mock version '{}': {}", version, e))
}

impl PackageProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> ProviderResult<()> {
        if self.state.borrow().unavailable {
            Err(ProviderError::Unavailable {
                provider: self.name.clone(),
                message: "scripted".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn query(&self, package: &str) -> ProviderResult<InstalledState> {
        self.record(MockCall::Query(package.to_string()));
        self.take_failure(Op::Query, package)?;
        Ok(match self.installed(package) {
            Some(version) => InstalledState::Present(version),
            None => InstalledState::Absent,
        })
    }

    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()> {
        self.record(MockCall::Install(package.to_string(), min_version.clone()));
        self.take_failure(Op::Install, package)?;

        let mut state = self.state.borrow_mut();
        if state.lying_installs.contains(package) {
            return Ok(());
        }
        let version = state
            .latest
            .get(package)
            .cloned()
            .unwrap_or_else(|| min_version.clone());
        state.installed.insert(package.to_string(), version);
        Ok(())
    }

    fn upgrade(&self, package: &str) -> ProviderResult<()> {
        self.record(MockCall::Upgrade(package.to_string()));
        self.take_failure(Op::Upgrade, package)?;

        let mut state = self.state.borrow_mut();
        if !state.installed.contains_key(package) {
            return Err(ProviderError::Other(format!(
                "'{}' is not installed",
                package
            )));
        }
        let latest = state.latest.get(package).cloned();
        if let Some(latest) = latest {
            state.installed.insert(package.to_string(), latest);
        }
        Ok(())
    }

    fn uninstall(&self, package: &str) -> ProviderResult<()> {
        self.record(MockCall::Uninstall(package.to_string()));
        self.take_failure(Op::Uninstall, package)?;

        if self.state.borrow_mut().installed.remove(package).is_none() {
            return Err(ProviderError::Other(format!(
                "'{}' is not installed",
                package
            )));
        }
        Ok(())
    }
}
