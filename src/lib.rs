//! Provisioner - converge installed packages to a catalog of minimum versions.
//!
//! A catalog lists packages with the oldest acceptable version of each.
//! The provisioner asks a package provider what is installed, installs or
//! upgrades what falls short, leaves the rest alone, and reports one
//! outcome per package. A failing package never stops the run.
//!
//! # Modules
//!
//! - [`catalog`] - Catalog loading, merging, and validation
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Fatal error types and result aliases
//! - [`prereq`] - Setup commands run before reconciliation
//! - [`provider`] - The package provider trait and its implementations
//! - [`reconciler`] - The per-package decide-and-execute loop
//! - [`report`] - Text and JSON report rendering
//! - [`shell`] - Shell command execution
//! - [`ui`] - Spinners and terminal output
//! - [`version`] - Dotted numeric versions
//!
//! # Example
//!
//! ```
//! use provisioner::provider::MockProvider;
//! use provisioner::reconciler::{reconcile, CatalogEntry, OutcomeKind};
//! use provisioner::version::VersionSpec;
//!
//! let provider = MockProvider::new()
//!     .with_installed("node", "18.2")
//!     .with_latest("node", "20.11");
//! let catalog = vec![
//!     CatalogEntry::new("git", VersionSpec::parse("2.30").unwrap()),
//!     CatalogEntry::new("node", VersionSpec::parse("20").unwrap()),
//! ];
//!
//! let report = reconcile(&catalog, false, &provider);
//! assert_eq!(report.records[0].kind, OutcomeKind::Success);
//! assert_eq!(report.records[1].kind, OutcomeKind::Updated);
//! ```

pub mod catalog;
pub mod cli;
pub mod error;
pub mod prereq;
pub mod provider;
pub mod reconciler;
pub mod report;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{ProvisionError, Result};
