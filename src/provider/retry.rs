//! Retry decorator for mutating provider calls.

use std::time::Duration;

use crate::version::VersionSpec;

use super::{InstalledState, PackageProvider, ProviderResult};

/// Retries `install`, `upgrade` and `uninstall` up to a total number of
/// attempts. `query` and `probe` pass straight through.
#[derive(Debug, Clone)]
pub struct RetryProvider<P> {
    inner: P,
    attempts: u32,
    delay: Duration,
}

impl<P: PackageProvider> RetryProvider<P> {
    /// Wrap `inner`, making at most `attempts` tries per call (minimum 1).
    pub fn new(inner: P, attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Total attempts per mutating call.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn with_retry<F>(&self, op: &str, package: &str, mut call: F) -> ProviderResult<()>
    where
        F: FnMut(&P) -> ProviderResult<()>,
    {
        let mut attempt = 1;
        loop {
            match call(&self.inner) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        "{} {} failed (attempt {}/{}): {}",
                        op,
                        package,
                        attempt,
                        self.attempts,
                        e
                    );
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<P: PackageProvider> PackageProvider for RetryProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn probe(&self) -> ProviderResult<()> {
        self.inner.probe()
    }

    fn query(&self, package: &str) -> ProviderResult<InstalledState> {
        self.inner.query(package)
    }

    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()> {
        self.with_retry("install", package, |p| p.install(package, min_version))
    }

    fn upgrade(&self, package: &str) -> ProviderResult<()> {
        self.with_retry("upgrade", package, |p| p.upgrade(package))
    }

    fn uninstall(&self, package: &str) -> ProviderResult<()> {
        self.with_retry("uninstall", package, |p| p.uninstall(package))
    }
}
