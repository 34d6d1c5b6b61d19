//! Catalog reconciliation.
//!
//! The reconciler walks a catalog in order, asks the provider what is
//! installed, decides an [`Action`] per entry and records exactly one
//! [`OutcomeRecord`] per entry in an [`InstallReport`].

pub mod action;
pub mod engine;
pub mod outcome;
pub mod plan;

pub use action::{decide, Action};
pub use engine::{reconcile, ReconcileProgress, Reconciler};
pub use outcome::{FailureKind, InstallReport, OutcomeKind, OutcomeRecord, ReportCounts};
pub use plan::{is_noop, plan, PlannedAction};

use serde::{Deserialize, Serialize};

use crate::version::VersionSpec;

/// One package the catalog requires, with its minimum version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub min_version: VersionSpec,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, min_version: VersionSpec) -> Self {
        Self {
            name: name.into(),
            min_version,
        }
    }
}
