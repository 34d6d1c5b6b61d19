//! Error types for provisioner operations.
//!
//! This module defines [`ProvisionError`], the error type for failures
//! that stop a run before any catalog entry is processed, and a [`Result`]
//! type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Per-package failures never become a `ProvisionError`. The reconciler
//!   records them as failed outcomes (see [`crate::reconciler::FailureKind`]).
//! - Use `ProvisionError` for setup failures that make a run impossible
//! - Use `anyhow::Error` (via `ProvisionError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error type for provisioner operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Catalog file not found at expected location.
    #[error("Catalog not found: {path}")]
    CatalogNotFound { path: PathBuf },

    /// Failed to parse catalog file.
    #[error("Failed to parse catalog at {path}: {message}")]
    CatalogParseError { path: PathBuf, message: String },

    /// Catalog parsed but contains invalid entries or backends.
    #[error("Invalid catalog: {message}")]
    CatalogValidationError { message: String },

    /// A prerequisite setup command failed.
    #[error("Setup step '{step}' failed: {message}")]
    SetupFailed { step: String, message: String },

    /// No configured backend is usable.
    #[error("Package provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// Shell command could not be started.
    #[error("Command failed ({}): {command}", crate::shell::exit_status(*.code))]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for provisioner operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
