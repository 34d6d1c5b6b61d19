//! Dry-run planning.

use serde::Serialize;

use crate::provider::{InstalledState, PackageProvider};

use super::action::{decide, Action};
use super::CatalogEntry;

/// What a run would do for one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedAction {
    pub name: String,
    pub min_version: String,
    /// Installed state, or `None` if the query failed.
    pub state: Option<InstalledState>,
    /// Decided action, or `None` if the query failed.
    pub action: Option<Action>,
    /// Query error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query every entry and decide its action without changing anything.
pub fn plan(
    catalog: &[CatalogEntry],
    force_reinstall: bool,
    provider: &dyn PackageProvider,
) -> Vec<PlannedAction> {
    catalog
        .iter()
        .map(|entry| match provider.query(&entry.name) {
            Ok(state) => PlannedAction {
                name: entry.name.clone(),
                min_version: entry.min_version.to_string(),
                action: Some(decide(&state, &entry.min_version, force_reinstall)),
                state: Some(state),
                error: None,
            },
            Err(e) => PlannedAction {
                name: entry.name.clone(),
                min_version: entry.min_version.to_string(),
                state: None,
                action: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// Whether a plan would change nothing.
pub fn is_noop(planned: &[PlannedAction]) -> bool {
    planned
        .iter()
        .all(|p| matches!(p.action, Some(Action::Skip)))
}
