//! The reconciliation loop.
//!
//! Every catalog entry walks the same path exactly once:
//!
//! ```text
//! Start → Queried → {Absent, Present} → ActionChosen → Executed → Recorded
//! ```
//!
//! Entries run one after another. Each provider call blocks, and no entry
//! starts before the previous one is recorded. Every provider error is
//! caught at the entry boundary and becomes a `Failed` record, so a run
//! always produces one record per entry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::provider::{InstalledState, PackageProvider};
use crate::version::VersionSpec;

use super::action::{decide, Action};
use super::outcome::{FailureKind, InstallReport, OutcomeRecord};
use super::CatalogEntry;

/// Detail recorded when a provider claims an install worked but the
/// package cannot be found afterwards.
pub const INSTALL_NOT_FOUND: &str = "install reported success but package not found";

/// Detail recorded when a provider claims an upgrade worked but the
/// package cannot be found afterwards.
pub const UPGRADE_NOT_FOUND: &str = "upgrade reported success but package not found";

/// Detail recorded for entries skipped by cancellation.
pub const CANCELLED: &str = "cancelled before processing";

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum ReconcileProgress<'a> {
    /// An entry is about to be queried.
    EntryStarting {
        entry: &'a CatalogEntry,
        index: usize,
        total: usize,
    },
    /// An entry has been recorded.
    EntryFinished {
        record: &'a OutcomeRecord,
        index: usize,
        total: usize,
    },
}

/// Converges installed packages to a catalog through a provider.
pub struct Reconciler<'a> {
    provider: &'a dyn PackageProvider,
    force_reinstall: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a provider.
    pub fn new(provider: &'a dyn PackageProvider) -> Self {
        Self {
            provider,
            force_reinstall: false,
            cancel: None,
        }
    }

    /// Uninstall packages that are present before installing them again.
    pub fn force_reinstall(mut self, force: bool) -> Self {
        self.force_reinstall = force;
        self
    }

    /// Stop starting new entries once `flag` is set.
    ///
    /// The flag is only checked between entries; an entry that has started
    /// always runs to completion.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Reconcile every entry in order.
    pub fn reconcile(&self, catalog: &[CatalogEntry]) -> InstallReport {
        self.reconcile_with_progress(catalog, |_| {})
    }

    /// Reconcile every entry in order, reporting progress.
    ///
    /// Duplicate names are not merged; each entry gets its own record.
    pub fn reconcile_with_progress<F>(
        &self,
        catalog: &[CatalogEntry],
        mut on_progress: F,
    ) -> InstallReport
    where
        F: FnMut(ReconcileProgress<'_>),
    {
        let started_at = Utc::now();
        let total = catalog.len();
        let mut records = Vec::with_capacity(total);

        info!(
            "Reconciling {} package(s) via {}{}",
            total,
            self.provider.name(),
            if self.force_reinstall {
                " (forced reinstall)"
            } else {
                ""
            }
        );

        for (index, entry) in catalog.iter().enumerate() {
            on_progress(ReconcileProgress::EntryStarting {
                entry,
                index,
                total,
            });

            let record = if self.is_cancelled() {
                OutcomeRecord::failed(&entry.name, None, FailureKind::Cancelled, CANCELLED)
            } else {
                self.process(entry)
            };

            if let Some(failure) = record.failure {
                warn!("{}: {} ({})", entry.name, record.detail, failure);
            }

            on_progress(ReconcileProgress::EntryFinished {
                record: &record,
                index,
                total,
            });
            records.push(record);
        }

        InstallReport {
            provider: self.provider.name().to_string(),
            force_reinstall: self.force_reinstall,
            started_at,
            finished_at: Utc::now(),
            records,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Run one entry through the state machine.
    fn process(&self, entry: &CatalogEntry) -> OutcomeRecord {
        let name = entry.name.as_str();

        debug!("query {}", name);
        let mut state = match self.provider.query(name) {
            Ok(state) => state,
            Err(e) => return OutcomeRecord::failed(name, None, FailureKind::Query, e.to_string()),
        };

        let action = decide(&state, &entry.min_version, self.force_reinstall);
        info!("{}: {} ({} → minimum {})", name, action, state, entry.min_version);

        if action == Action::Reinstall {
            debug!("uninstall {}", name);
            if let Err(e) = self.provider.uninstall(name) {
                return OutcomeRecord::failed(
                    name,
                    Some(action),
                    FailureKind::Uninstall,
                    e.to_string(),
                )
                .with_version(state.version().cloned());
            }
            state = InstalledState::Absent;
        }

        match (action, state) {
            (Action::Skip, InstalledState::Present(current)) => {
                OutcomeRecord::skipped(name, current)
            }
            (Action::Upgrade, InstalledState::Present(current)) => {
                self.upgrade(name, current, &entry.min_version)
            }
            (Action::Install | Action::Reinstall, InstalledState::Absent) => {
                self.install(name, action, &entry.min_version)
            }
            // decide() never pairs Skip/Upgrade with Absent, and Reinstall has
            // already moved the state to Absent above.
            (action, state) => OutcomeRecord::failed(
                name,
                Some(action),
                FailureKind::Consistency,
                format!("cannot {} a package that is {}", action, state),
            ),
        }
    }

    fn install(&self, name: &str, action: Action, min_version: &VersionSpec) -> OutcomeRecord {
        debug!("install {} >= {}", name, min_version);
        if let Err(e) = self.provider.install(name, min_version) {
            return OutcomeRecord::failed(name, Some(action), FailureKind::Install, e.to_string());
        }

        match self.provider.query(name) {
            Ok(InstalledState::Present(installed)) => {
                if installed < *min_version {
                    warn!(
                        "{}: installed {} is below minimum {}",
                        name, installed, min_version
                    );
                }
                OutcomeRecord::success(name, action, installed)
            }
            Ok(InstalledState::Absent) => OutcomeRecord::failed(
                name,
                Some(action),
                FailureKind::Consistency,
                INSTALL_NOT_FOUND,
            ),
            Err(e) => OutcomeRecord::failed(
                name,
                Some(action),
                FailureKind::Query,
                format!("installed, but verification failed: {}", e),
            ),
        }
    }

    fn upgrade(&self, name: &str, current: VersionSpec, min_version: &VersionSpec) -> OutcomeRecord {
        debug!("upgrade {} from {}", name, current);
        if let Err(e) = self.provider.upgrade(name) {
            return OutcomeRecord::failed(
                name,
                Some(Action::Upgrade),
                FailureKind::Upgrade,
                e.to_string(),
            )
            .with_version(Some(current));
        }

        match self.provider.query(name) {
            Ok(InstalledState::Present(upgraded)) => {
                let mut detail = format!("{} → {}", current, upgraded);
                if upgraded < *min_version {
                    warn!(
                        "{}: upgraded to {} which is still below minimum {}",
                        name, upgraded, min_version
                    );
                    detail.push_str(&format!(" (still below minimum {})", min_version));
                }
                OutcomeRecord::updated(name, current, upgraded, detail)
            }
            Ok(InstalledState::Absent) => OutcomeRecord::failed(
                name,
                Some(Action::Upgrade),
                FailureKind::Consistency,
                UPGRADE_NOT_FOUND,
            ),
            Err(e) => OutcomeRecord::failed(
                name,
                Some(Action::Upgrade),
                FailureKind::Query,
                format!("upgraded, but verification failed: {}", e),
            ),
        }
    }
}

/// Reconcile a catalog against a provider.
///
/// Shorthand for `Reconciler::new(provider).force_reinstall(force).reconcile(catalog)`.
pub fn reconcile(
    catalog: &[CatalogEntry],
    force_reinstall: bool,
    provider: &dyn PackageProvider,
) -> InstallReport {
    Reconciler::new(provider)
        .force_reinstall(force_reinstall)
        .reconcile(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FallbackProvider, MockCall, MockProvider};
    use crate::reconciler::OutcomeKind;

    fn v(s: &str) -> VersionSpec {
        VersionSpec::parse(s).unwrap()
    }

    fn entry(name: &str, min: &str) -> CatalogEntry {
        CatalogEntry::new(name, v(min))
    }

    #[test]
    fn absent_then_outdated_scenario() {
        let provider = MockProvider::new()
            .with_installed("B", "1.5")
            .with_latest("B", "2.0");
        let report = reconcile(&[entry("A", "1.0"), entry("B", "2.0")], false, &provider);

        assert_eq!(report.records.len(), 2);

        let a = &report.records[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.action, Some(Action::Install));
        assert_eq!(a.kind, OutcomeKind::Success);
        assert_eq!(a.version, Some(v("1.0")));

        let b = &report.records[1];
        assert_eq!(b.name, "B");
        assert_eq!(b.action, Some(Action::Upgrade));
        assert_eq!(b.kind, OutcomeKind::Updated);
        assert_eq!(b.previous_version, Some(v("1.5")));
        assert_eq!(b.version, Some(v("2.0")));
        assert_eq!(b.detail, "1.5 → 2.0");
    }

    #[test]
    fn satisfied_entry_makes_no_mutating_calls() {
        let provider = MockProvider::new().with_installed("git", "2.0.0");
        let report = reconcile(&[entry("git", "2.0")], false, &provider);

        assert_eq!(report.records[0].kind, OutcomeKind::Skipped);
        assert_eq!(report.records[0].version, Some(v("2.0.0")));
        assert!(provider.mutating_calls().is_empty());
        assert_eq!(provider.calls(), vec![MockCall::Query("git".into())]);
    }

    #[test]
    fn install_failure_does_not_block_next_entry() {
        let provider = MockProvider::new().fail_install("A");
        let report = reconcile(&[entry("A", "1.0"), entry("B", "1.0")], false, &provider);

        assert_eq!(report.records[0].name, "A");
        assert_eq!(report.records[0].kind, OutcomeKind::Failed);
        assert_eq!(report.records[0].failure, Some(FailureKind::Install));
        assert_eq!(report.records[1].name, "B");
        assert_eq!(report.records[1].kind, OutcomeKind::Success);
    }

    #[test]
    fn lying_install_is_consistency_failure() {
        let provider = MockProvider::new().lie_on_install("A");
        let report = reconcile(&[entry("A", "1.0")], false, &provider);

        let record = &report.records[0];
        assert_eq!(record.kind, OutcomeKind::Failed);
        assert_eq!(record.failure, Some(FailureKind::Consistency));
        assert_eq!(record.detail, INSTALL_NOT_FOUND);
    }

    #[test]
    fn force_reinstall_uninstalls_then_installs() {
        let provider = MockProvider::new().with_installed("git", "3.0");
        let report = reconcile(&[entry("git", "2.0")], true, &provider);

        assert_eq!(
            provider.mutating_calls(),
            vec![
                MockCall::Uninstall("git".into()),
                MockCall::Install("git".into(), v("2.0")),
            ]
        );
        assert_eq!(report.records[0].action, Some(Action::Reinstall));
        assert_eq!(report.records[0].kind, OutcomeKind::Success);
        assert!(report.force_reinstall);
    }

    #[test]
    fn force_reinstall_of_absent_package_just_installs() {
        let provider = MockProvider::new();
        let report = reconcile(&[entry("git", "2.0")], true, &provider);

        assert_eq!(
            provider.mutating_calls(),
            vec![MockCall::Install("git".into(), v("2.0"))]
        );
        assert_eq!(report.records[0].action, Some(Action::Install));
    }

    #[test]
    fn failed_uninstall_skips_install() {
        let provider = MockProvider::new()
            .with_installed("git", "3.0")
            .fail_uninstall("git");
        let report = reconcile(&[entry("git", "2.0")], true, &provider);

        let record = &report.records[0];
        assert_eq!(record.failure, Some(FailureKind::Uninstall));
        assert_eq!(record.version, Some(v("3.0")));
        assert_eq!(
            provider.mutating_calls(),
            vec![MockCall::Uninstall("git".into())]
        );
    }

    #[test]
    fn query_failure_is_recorded_without_action() {
        let provider = MockProvider::new().fail_query("A");
        let report = reconcile(&[entry("A", "1.0"), entry("B", "1.0")], false, &provider);

        assert_eq!(report.records[0].failure, Some(FailureKind::Query));
        assert_eq!(report.records[0].action, None);
        assert!(provider.calls_for("A").iter().all(|c| !c.is_mutating()));
        assert_eq!(report.records[1].kind, OutcomeKind::Success);
    }

    #[test]
    fn backend_chain_query_error_is_not_treated_as_absent() {
        let primary = MockProvider::named("primary")
            .with_installed("git", "2.40")
            .fail_query("git");
        let secondary = MockProvider::named("secondary");
        let chain = FallbackProvider::new(vec![
            Box::new(primary.clone()) as Box<dyn PackageProvider>,
            Box::new(secondary.clone()),
        ]);

        let report = reconcile(&[entry("git", "2.0")], false, &chain);

        assert_eq!(report.records[0].kind, OutcomeKind::Failed);
        assert_eq!(report.records[0].failure, Some(FailureKind::Query));
        assert_eq!(report.records[0].action, None);
        assert!(primary.mutating_calls().is_empty());
        assert!(secondary.mutating_calls().is_empty());
    }

    #[test]
    fn upgrade_failure_keeps_current_version() {
        let provider = MockProvider::new()
            .with_installed("node", "18.0")
            .fail_upgrade("node");
        let report = reconcile(&[entry("node", "20")], false, &provider);

        let record = &report.records[0];
        assert_eq!(record.failure, Some(FailureKind::Upgrade));
        assert_eq!(record.version, Some(v("18.0")));
    }

    #[test]
    fn upgrade_short_of_minimum_is_noted() {
        let provider = MockProvider::new()
            .with_installed("node", "18.0")
            .with_latest("node", "19.2");
        let report = reconcile(&[entry("node", "20")], false, &provider);

        let record = &report.records[0];
        assert_eq!(record.kind, OutcomeKind::Updated);
        assert!(record.detail.contains("18.0 → 19.2"));
        assert!(record.detail.contains("still below minimum 20"));
    }

    #[test]
    fn total_provider_failure_still_reports_every_entry() {
        let provider = MockProvider::new()
            .fail_query("a")
            .fail_query("b")
            .fail_query("c");
        let catalog = [entry("a", "1"), entry("b", "1"), entry("c", "1")];
        let report = reconcile(&catalog, false, &provider);

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.counts().failed, 3);
    }

    #[test]
    fn empty_catalog_gives_empty_report() {
        let provider = MockProvider::new();
        let report = reconcile(&[], false, &provider);
        assert!(report.records.is_empty());
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn duplicate_names_get_one_record_each() {
        let provider = MockProvider::new();
        let report = reconcile(&[entry("git", "1.0"), entry("git", "2.0")], false, &provider);

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].kind, OutcomeKind::Success);
        // The second entry sees the first entry's install and upgrades it.
        assert_eq!(report.records[1].action, Some(Action::Upgrade));
    }

    #[test]
    fn cancelled_run_records_remaining_entries() {
        let provider = MockProvider::new();
        let flag = Arc::new(AtomicBool::new(false));
        let reconciler = Reconciler::new(&provider).cancel_flag(Arc::clone(&flag));

        let catalog = [entry("a", "1"), entry("b", "1"), entry("c", "1")];
        let report = reconciler.reconcile_with_progress(&catalog, |progress| {
            if let ReconcileProgress::EntryFinished { index: 0, .. } = progress {
                flag.store(true, Ordering::SeqCst);
            }
        });

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[0].kind, OutcomeKind::Success);
        assert_eq!(report.records[1].failure, Some(FailureKind::Cancelled));
        assert_eq!(report.records[2].failure, Some(FailureKind::Cancelled));
        assert!(provider.calls_for("b").is_empty());
        assert!(provider.calls_for("c").is_empty());
    }

    #[test]
    fn progress_events_bracket_each_entry() {
        let provider = MockProvider::new().with_installed("b", "1");
        let mut events = Vec::new();
        Reconciler::new(&provider).reconcile_with_progress(
            &[entry("a", "1"), entry("b", "1")],
            |progress| match progress {
                ReconcileProgress::EntryStarting { entry, index, total } => {
                    events.push(format!("start {} {}/{}", entry.name, index, total))
                }
                ReconcileProgress::EntryFinished { record, .. } => {
                    events.push(format!("done {} {}", record.name, record.kind))
                }
            },
        );

        assert_eq!(
            events,
            vec!["start a 0/2", "done a success", "start b 1/2", "done b skipped"]
        );
    }
}
