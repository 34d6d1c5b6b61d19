//! Catalog validation rules.
//!
//! - At least one backend, each with non-empty commands
//! - `version_pattern` compiles and has a capture group
//! - Package names are non-empty and unique

use std::collections::HashSet;

use regex::Regex;

use crate::catalog::schema::CatalogConfig;
use crate::error::{ProvisionError, Result};
use crate::reconciler::CatalogEntry;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &'static str, message: String) -> Self {
        Self { rule, message }
    }
}

/// Validate a catalog and return all errors.
///
/// Collects every error rather than stopping at the first one.
pub fn validate_catalog(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = validate_backends(config);
    errors.extend(validate_setup(config));
    errors.extend(validate_packages(config));
    errors
}

fn validate_backends(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::new(
            "no-backends",
            "At least one backend must be configured".to_string(),
        ));
    }

    for backend in &config.backends {
        if backend.name.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-backend-name",
                "Backend name must not be empty".to_string(),
            ));
        }

        let commands = [
            ("query", &backend.query),
            ("install", &backend.install),
            ("upgrade", &backend.upgrade),
            ("uninstall", &backend.uninstall),
        ];
        for (field, command) in commands {
            if command.trim().is_empty() {
                errors.push(ValidationError::new(
                    "empty-command",
                    format!("Backend '{}' has an empty '{}' command", backend.name, field),
                ));
            }
        }

        match Regex::new(&backend.version_pattern) {
            Ok(re) if re.captures_len() < 2 => errors.push(ValidationError::new(
                "pattern-without-group",
                format!(
                    "Backend '{}' version_pattern has no capture group",
                    backend.name
                ),
            )),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new(
                "invalid-pattern",
                format!(
                    "Backend '{}' version_pattern is invalid: {}",
                    backend.name, e
                ),
            )),
        }
    }

    errors
}

fn validate_setup(config: &CatalogConfig) -> Vec<ValidationError> {
    config
        .setup
        .iter()
        .filter(|step| step.command.trim().is_empty())
        .map(|step| {
            ValidationError::new(
                "empty-setup-command",
                format!("Setup step '{}' has an empty command", step.name),
            )
        })
        .collect()
}

fn validate_packages(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, package) in config.packages.iter().enumerate() {
        let name = package.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                "empty-package-name",
                format!("Package #{} has an empty name", index + 1),
            ));
            continue;
        }

        if !seen.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-package",
                format!("Package '{}' is listed more than once", name),
            ));
        }
    }

    errors
}

/// Validate a catalog and produce its entries in file order.
///
/// # Errors
///
/// Returns `CatalogValidationError` listing every problem found.
pub fn catalog_entries(config: &CatalogConfig) -> Result<Vec<CatalogEntry>> {
    let errors = validate_catalog(config);
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ProvisionError::CatalogValidationError { message });
    }

    Ok(config
        .packages
        .iter()
        .map(|p| CatalogEntry::new(p.name.trim(), p.min_version.clone()))
        .collect())
}
