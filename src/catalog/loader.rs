//! Catalog file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::merger::deep_merge;
use crate::catalog::schema::CatalogConfig;
use crate::error::{ProvisionError, Result};

/// Directory holding catalog files, relative to the project root.
pub const CATALOG_DIR: &str = ".provisioner";

/// Paths to catalog files in merge order (later overrides earlier).
///
/// 1. Project catalog (`.provisioner/catalog.yml`)
/// 2. Local overrides (`.provisioner/catalog.local.yml`)
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    /// Project catalog: .provisioner/catalog.yml
    pub project: PathBuf,

    /// Local overrides: .provisioner/catalog.local.yml
    pub project_local: Option<PathBuf>,
}

impl CatalogPaths {
    /// Discover catalog files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CATALOG_DIR);
        let local = dir.join("catalog.local.yml");
        Self {
            project: dir.join("catalog.yml"),
            project_local: local.exists().then_some(local),
        }
    }

    /// Use an explicit catalog file; no local override applies.
    pub fn explicit(path: &Path) -> Self {
        Self {
            project: path.to_path_buf(),
            project_local: None,
        }
    }

    /// Whether the primary catalog exists.
    pub fn has_catalog(&self) -> bool {
        self.project.is_file()
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for a `.provisioner` directory first, then falls back to `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CATALOG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a catalog file as a raw YAML value, for merging.
pub fn load_catalog_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProvisionError::CatalogNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProvisionError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| ProvisionError::CatalogParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into a [`CatalogConfig`].
pub fn parse_catalog(content: &str, source_path: &Path) -> Result<CatalogConfig> {
    serde_yaml::from_str(content).map_err(|e| ProvisionError::CatalogParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the catalog, merging the local override when present.
///
/// # Errors
///
/// Returns `CatalogNotFound` if the primary catalog doesn't exist.
/// Returns `CatalogParseError` if either file is invalid.
pub fn load_catalog(paths: &CatalogPaths) -> Result<CatalogConfig> {
    let mut value = load_catalog_value(&paths.project)?;

    if let Some(local) = &paths.project_local {
        tracing::debug!("Merging local overrides from {}", local.display());
        value = deep_merge(&value, &load_catalog_value(local)?);
    }

    // An empty file parses as null.
    if value.is_null() {
        value = serde_yaml::Value::Mapping(Default::default());
    }

    let source = paths.project_local.as_ref().unwrap_or(&paths.project);
    serde_yaml::from_value(value).map_err(|e| ProvisionError::CatalogParseError {
        path: source.clone(),
        message: e.to_string(),
    })
}
