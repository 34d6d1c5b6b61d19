//! Ordered chain of backends behind one provider.
//!
//! Lets a catalog name a primary package manager and one or more
//! secondary ones. The reconciler only ever sees a single provider.

use crate::version::VersionSpec;

use super::{InstalledState, PackageProvider, ProviderError, ProviderResult};

/// Tries each backend in order.
///
/// - `query`: the first backend reporting `Present` wins. Otherwise the
///   package is `Absent` only if every backend answered `Absent`; any
///   backend error makes the state unknown and yields
///   [`ProviderError::Exhausted`].
/// - `install`, `upgrade`, `uninstall`: the first backend that succeeds
///   wins; if all fail the errors are collected into `Exhausted`.
pub struct FallbackProvider {
    name: String,
    backends: Vec<Box<dyn PackageProvider>>,
}

impl FallbackProvider {
    /// Create a chain from backends in priority order.
    pub fn new(backends: Vec<Box<dyn PackageProvider>>) -> Self {
        let name = backends
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(" > ");
        Self { name, backends }
    }

    /// Number of backends in the chain.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    fn first_success<F>(&self, op: &str, package: &str, mut call: F) -> ProviderResult<()>
    where
        F: FnMut(&dyn PackageProvider) -> ProviderResult<()>,
    {
        let mut errors = Vec::new();
        for backend in &self.backends {
            match call(&**backend) {
                Ok(()) => {
                    tracing::debug!("{} {} via {}", op, package, backend.name());
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("{} {} via {} failed: {}", op, package, backend.name(), e);
                    errors.push(e);
                }
            }
        }
        Err(ProviderError::Exhausted { errors })
    }
}

impl PackageProvider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> ProviderResult<()> {
        let mut errors = Vec::new();
        for backend in &self.backends {
            match backend.probe() {
                Ok(()) => return Ok(()),
                Err(e) => errors.push(e),
            }
        }
        Err(ProviderError::Exhausted { errors })
    }

    fn query(&self, package: &str) -> ProviderResult<InstalledState> {
        let mut errors = Vec::new();

        for backend in &self.backends {
            match backend.query(package) {
                Ok(InstalledState::Present(version)) => {
                    tracing::debug!("{} {} found via {}", package, version, backend.name());
                    return Ok(InstalledState::Present(version));
                }
                Ok(InstalledState::Absent) => {}
                Err(e) => {
                    tracing::debug!("query {} via {} failed: {}", package, backend.name(), e);
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() && !self.backends.is_empty() {
            Ok(InstalledState::Absent)
        } else {
            Err(ProviderError::Exhausted { errors })
        }
    }

    fn install(&self, package: &str, min_version: &VersionSpec) -> ProviderResult<()> {
        self.first_success("install", package, |b| b.install(package, min_version))
    }

    fn upgrade(&self, package: &str) -> ProviderResult<()> {
        self.first_success("upgrade", package, |b| b.upgrade(package))
    }

    fn uninstall(&self, package: &str) -> ProviderResult<()> {
        self.first_success("uninstall", package, |b| b.uninstall(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockCall, MockProvider};

    fn v(s: &str) -> VersionSpec {
        VersionSpec::parse(s).unwrap()
    }

    fn chain(primary: &MockProvider, secondary: &MockProvider) -> FallbackProvider {
        let backends: Vec<Box<dyn PackageProvider>> =
            vec![Box::new(primary.clone()), Box::new(secondary.clone())];
        FallbackProvider::new(backends)
    }

    #[test]
    fn name_lists_backends_in_order() {
        let fallback = chain(&MockProvider::named("winget"), &MockProvider::named("msstore"));
        assert_eq!(fallback.name(), "winget > msstore");
        assert_eq!(fallback.len(), 2);
    }

    #[test]
    fn query_prefers_first_present() {
        let primary = MockProvider::named("a").with_installed("git", "2.40");
        let secondary = MockProvider::named("b").with_installed("git", "2.45");
        let fallback = chain(&primary, &secondary);

        assert_eq!(
            fallback.query("git").unwrap(),
            InstalledState::Present(v("2.40"))
        );
        assert!(secondary.calls().is_empty());
    }

    #[test]
    fn query_falls_through_absent_to_present() {
        let primary = MockProvider::named("a");
        let secondary = MockProvider::named("b").with_installed("git", "2.45");
        let fallback = chain(&primary, &secondary);

        assert_eq!(
            fallback.query("git").unwrap(),
            InstalledState::Present(v("2.45"))
        );
    }

    #[test]
    fn query_error_is_not_outvoted_by_absent() {
        let primary = MockProvider::named("a").fail_query("git");
        let secondary = MockProvider::named("b");
        let fallback = chain(&primary, &secondary);

        match fallback.query("git") {
            Err(ProviderError::Exhausted { errors }) => assert_eq!(errors.len(), 1),
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn query_error_then_present_is_present() {
        let primary = MockProvider::named("a").fail_query("git");
        let secondary = MockProvider::named("b").with_installed("git", "2.45");
        let fallback = chain(&primary, &secondary);

        assert_eq!(
            fallback.query("git").unwrap(),
            InstalledState::Present(v("2.45"))
        );
    }

    #[test]
    fn query_absent_everywhere_is_absent() {
        let fallback = chain(&MockProvider::named("a"), &MockProvider::named("b"));
        assert_eq!(fallback.query("git").unwrap(), InstalledState::Absent);
    }

    #[test]
    fn query_all_errors_is_exhausted() {
        let primary = MockProvider::named("a").fail_query("git");
        let secondary = MockProvider::named("b").fail_query("git");
        let fallback = chain(&primary, &secondary);

        match fallback.query("git") {
            Err(ProviderError::Exhausted { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn install_uses_secondary_when_primary_fails() {
        let primary = MockProvider::named("a").fail_install("git");
        let secondary = MockProvider::named("b");
        let fallback = chain(&primary, &secondary);

        fallback.install("git", &v("2.0")).unwrap();

        assert_eq!(
            secondary.calls(),
            vec![MockCall::Install("git".into(), v("2.0"))]
        );
        assert!(secondary.installed("git").is_some());
        assert!(primary.installed("git").is_none());
    }

    #[test]
    fn install_stops_at_first_success() {
        let primary = MockProvider::named("a");
        let secondary = MockProvider::named("b");
        let fallback = chain(&primary, &secondary);

        fallback.install("git", &v("2.0")).unwrap();

        assert!(secondary.calls().is_empty());
    }

    #[test]
    fn all_failures_exhausted() {
        let primary = MockProvider::named("a").fail_upgrade("git");
        let secondary = MockProvider::named("b").fail_upgrade("git");
        let fallback = chain(&primary, &secondary);

        assert!(matches!(
            fallback.upgrade("git"),
            Err(ProviderError::Exhausted { .. })
        ));
    }

    #[test]
    fn probe_needs_one_available_backend() {
        let down = MockProvider::named("a").unavailable();
        let up = MockProvider::named("b");
        assert!(chain(&down, &up).probe().is_ok());
        assert!(chain(&down, &down.clone()).probe().is_err());
    }

    #[test]
    fn empty_chain_is_exhausted() {
        let fallback = FallbackProvider::new(Vec::new());
        assert!(fallback.is_empty());
        assert!(fallback.query("git").is_err());
        assert!(fallback.uninstall("git").is_err());
    }
}
