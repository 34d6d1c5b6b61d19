//! Package providers.
//!
//! A [`PackageProvider`] is the only way the reconciler touches the
//! outside world. It answers "what version of X is installed?" and
//! performs install, upgrade, and uninstall for one package at a time.
//!
//! # Modules
//!
//! - [`command`] - Provider driven by shell command templates
//! - [`fallback`] - Ordered chain of backends behind one provider
//! - [`retry`] - Decorator that retries mutating calls
//! - [`mock`] - Scriptable in-memory provider for tests
//! - [`builder`] - Assemble the provider described by a catalog
//!
//! # Contract
//!
//! `query` never mutates state. `install`, `upgrade` and `uninstall` are
//! safe for a caller to retry, but the reconciler never does; retry
//! policy belongs to [`RetryProvider`] or the backend itself.

pub mod builder;
pub mod command;
pub mod error;
pub mod fallback;
pub mod mock;
pub mod retry;
pub mod state;

pub use builder::build_provider;
pub use command::CommandProvider;
pub use error::ProviderError;
pub use fallback::FallbackProvider;
pub use mock::{MockCall, MockProvider};
pub use retry::RetryProvider;
pub use state::InstalledState;

use crate::version::VersionSpec;

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Query and mutate installed packages.
pub trait PackageProvider {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Check that the backend can be used at all.
    fn probe(&self) -> ProviderResult<()> {
        Ok(())
    }

    /// Report the installed state of a package. Must not mutate.
    fn query(&self, package: &str) -> ProviderResult<InstalledState>;

    /// Install a package at `min_version` or newer.
    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()>;

    /// Upgrade an installed package to the newest version the backend offers.
    fn upgrade(&self, package: &str) -> ProviderResult<()>;

    /// Remove an installed package.
    fn uninstall(&self, package: &str) -> ProviderResult<()>;
}

impl<P: PackageProvider + ?Sized> PackageProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn probe(&self) -> ProviderResult<()> {
        (**self).probe()
    }

    fn query(&self, package: &str) -> ProviderResult<InstalledState> {
        (**self).query(package)
    }

    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()> {
        (**self).install(package, min_version)
    }

    fn upgrade(&self, package: &str) -> ProviderResult<()> {
        (**self).upgrade(package)
    }

    fn uninstall(&self, package: &str) -> ProviderResult<()> {
        (**self).uninstall(package)
    }
}
