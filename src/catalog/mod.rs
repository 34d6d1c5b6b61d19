//! Catalog loading and validation.
//!
//! A catalog lives at `.provisioner/catalog.yml` under the project root
//! and lists the backends to drive and the packages to converge. An
//! optional `.provisioner/catalog.local.yml` is merged on top.

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{find_project_root, load_catalog, CatalogPaths, CATALOG_DIR};
pub use schema::{BackendConfig, CatalogConfig, OutputMode, PackageConfig, SetupStep, Settings};
pub use validator::{catalog_entries, validate_catalog, ValidationError};

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::reconciler::CatalogEntry;

/// A loaded and validated catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// File the catalog was read from.
    pub source: PathBuf,
    /// Parsed configuration, after local overrides.
    pub config: CatalogConfig,
    /// Validated entries in file order.
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load and validate the catalog for a project.
    ///
    /// `explicit` replaces discovery with a specific file.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let paths = match explicit {
            Some(path) => CatalogPaths::explicit(path),
            None => CatalogPaths::discover(project_root),
        };
        let config = load_catalog(&paths)?;
        let entries = catalog_entries(&config)?;
        tracing::debug!(
            "Loaded {} package(s) and {} backend(s) from {}",
            entries.len(),
            config.backends.len(),
            paths.project.display()
        );

        Ok(Self {
            source: paths.project,
            config,
            entries,
        })
    }

    /// Display name for headers.
    pub fn app_name(&self) -> &str {
        self.config.app_name.as_deref().unwrap_or("provisioner")
    }
}
