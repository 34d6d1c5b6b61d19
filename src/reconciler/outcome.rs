//! Per-entry outcomes and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::version::VersionSpec;

use super::action::Action;

/// How an entry ended up.
///
/// Variant order is the presentation order of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Installed (or reinstalled) and verified.
    Success,
    /// Upgraded and verified.
    Updated,
    /// Already satisfied; untouched.
    Skipped,
    /// Something went wrong; see the record's failure kind.
    Failed,
}

impl OutcomeKind {
    /// All kinds in presentation order.
    pub const ALL: [OutcomeKind; 4] = [
        OutcomeKind::Success,
        OutcomeKind::Updated,
        OutcomeKind::Skipped,
        OutcomeKind::Failed,
    ];
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Updated => "updated",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The installed state could not be determined.
    Query,
    /// The provider's install call failed.
    Install,
    /// The provider's upgrade call failed.
    Upgrade,
    /// The forced uninstall failed; no install was attempted.
    Uninstall,
    /// The provider reported success but the package is not there.
    /// Points at a provider bug rather than an ordinary failure.
    Consistency,
    /// The run was cancelled before this entry started.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Query => "query error",
            FailureKind::Install => "install error",
            FailureKind::Upgrade => "upgrade error",
            FailureKind::Uninstall => "uninstall error",
            FailureKind::Consistency => "consistency error",
            FailureKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The single result recorded for one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Package name.
    pub name: String,
    /// Action taken; `None` when the entry failed before a decision.
    pub action: Option<Action>,
    /// Version installed after the entry was processed.
    pub version: Option<VersionSpec>,
    /// Version installed before, when it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<VersionSpec>,
    /// How the entry ended up.
    pub kind: OutcomeKind,
    /// Failure tag, set exactly when `kind` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Human-readable detail.
    pub detail: String,
}

impl OutcomeRecord {
    /// An install or reinstall that was verified.
    pub fn success(name: &str, action: Action, version: VersionSpec) -> Self {
        Self {
            name: name.to_string(),
            action: Some(action),
            detail: format!("installed {}", version),
            version: Some(version),
            previous_version: None,
            kind: OutcomeKind::Success,
            failure: None,
        }
    }

    /// An upgrade that was verified.
    pub fn updated(name: &str, from: VersionSpec, to: VersionSpec, detail: String) -> Self {
        Self {
            name: name.to_string(),
            action: Some(Action::Upgrade),
            version: Some(to),
            previous_version: Some(from),
            kind: OutcomeKind::Updated,
            failure: None,
            detail,
        }
    }

    /// An entry that already met its minimum.
    pub fn skipped(name: &str, version: VersionSpec) -> Self {
        Self {
            name: name.to_string(),
            action: Some(Action::Skip),
            detail: format!("{} already installed", version),
            version: Some(version),
            previous_version: None,
            kind: OutcomeKind::Skipped,
            failure: None,
        }
    }

    /// A failed entry.
    pub fn failed(
        name: &str,
        action: Option<Action>,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            action,
            version: None,
            previous_version: None,
            kind: OutcomeKind::Failed,
            failure: Some(failure),
            detail: detail.into(),
        }
    }

    /// Attach the version that is installed despite the failure.
    pub fn with_version(mut self, version: Option<VersionSpec>) -> Self {
        self.version = version;
        self
    }

    /// Whether the entry failed.
    pub fn is_failed(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }
}

/// Totals per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub success: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ReportCounts {
    /// Fold a sequence of records into totals.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a OutcomeRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut counts, record| {
                match record.kind {
                    OutcomeKind::Success => counts.success += 1,
                    OutcomeKind::Updated => counts.updated += 1,
                    OutcomeKind::Skipped => counts.skipped += 1,
                    OutcomeKind::Failed => counts.failed += 1,
                }
                counts
            })
    }

    /// Count for one kind.
    pub fn get(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Success => self.success,
            OutcomeKind::Updated => self.updated,
            OutcomeKind::Skipped => self.skipped,
            OutcomeKind::Failed => self.failed,
        }
    }

    /// Sum of all kinds.
    pub fn total(&self) -> usize {
        self.success + self.updated + self.skipped + self.failed
    }
}

/// The result of one reconciliation run.
///
/// Holds exactly one record per catalog entry, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallReport {
    /// Provider that served the run.
    pub provider: String,
    /// Whether installed packages were forcibly reinstalled.
    pub force_reinstall: bool,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last entry was recorded.
    pub finished_at: DateTime<Utc>,
    /// One record per catalog entry.
    pub records: Vec<OutcomeRecord>,
}

impl InstallReport {
    /// Totals computed from the records.
    pub fn counts(&self) -> ReportCounts {
        ReportCounts::from_records(&self.records)
    }

    /// Records of one kind, in catalog order.
    pub fn records_of(&self, kind: OutcomeKind) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Whether any entry failed.
    pub fn has_failures(&self) -> bool {
        self.records.iter().any(OutcomeRecord::is_failed)
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionSpec {
        VersionSpec::parse(s).unwrap()
    }

    fn report(records: Vec<OutcomeRecord>) -> InstallReport {
        let now = Utc::now();
        InstallReport {
            provider: "mock".to_string(),
            force_reinstall: false,
            started_at: now,
            finished_at: now,
            records,
        }
    }

    #[test]
    fn kinds_order_for_presentation() {
        let mut kinds = vec![
            OutcomeKind::Failed,
            OutcomeKind::Skipped,
            OutcomeKind::Success,
            OutcomeKind::Updated,
        ];
        kinds.sort();
        assert_eq!(kinds, OutcomeKind::ALL.to_vec());
    }

    #[test]
    fn constructors_set_kind_and_failure() {
        let ok = OutcomeRecord::success("git", Action::Install, v("2.0"));
        assert_eq!(ok.kind, OutcomeKind::Success);
        assert!(ok.failure.is_none());

        let bad = OutcomeRecord::failed("git", None, FailureKind::Query, "boom");
        assert!(bad.is_failed());
        assert_eq!(bad.failure, Some(FailureKind::Query));
        assert!(bad.action.is_none());
        assert!(bad.version.is_none());
    }

    #[test]
    fn counts_are_a_fold() {
        let r = report(vec![
            OutcomeRecord::success("a", Action::Install, v("1.0")),
            OutcomeRecord::updated("b", v("1.5"), v("2.0"), "1.5 → 2.0".into()),
            OutcomeRecord::skipped("c", v("3.0")),
            OutcomeRecord::skipped("d", v("3.0")),
            OutcomeRecord::failed("e", Some(Action::Install), FailureKind::Install, "x"),
        ]);
        let counts = r.counts();
        assert_eq!(counts.success, 1);
        assert_eq!(counts.updated, 1);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get(OutcomeKind::Skipped), 2);
        assert!(r.has_failures());
    }

    #[test]
    fn records_of_keeps_catalog_order() {
        let r = report(vec![
            OutcomeRecord::skipped("z", v("1")),
            OutcomeRecord::success("a", Action::Install, v("1")),
            OutcomeRecord::skipped("m", v("1")),
        ]);
        let names: Vec<&str> = r
            .records_of(OutcomeKind::Skipped)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "m"]);
    }

    #[test]
    fn empty_report_has_zero_counts() {
        let r = report(Vec::new());
        assert_eq!(r.counts(), ReportCounts::default());
        assert!(!r.has_failures());
    }

    #[test]
    fn record_serializes_without_empty_optionals() {
        let json = serde_json::to_value(OutcomeRecord::skipped("git", v("2.0"))).unwrap();
        assert_eq!(json["kind"], "skipped");
        assert_eq!(json["action"], "skip");
        assert_eq!(json["version"], "2.0");
        assert!(json.get("failure").is_none());
        assert!(json.get("previous_version").is_none());
    }
}
