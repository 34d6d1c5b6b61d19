//! Errors returned by package providers.

use thiserror::Error;

use crate::shell::exit_status;

/// A provider call that could not complete.
///
/// "Package not installed" is not an error; it is
/// [`InstalledState::Absent`](super::InstalledState::Absent).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend tool could not be run at all.
    #[error("backend '{provider}' unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// A backend command ran and failed.
    #[error("`{command}` failed ({}){}", exit_status(*.code), detail_suffix(.detail))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        detail: Option<String>,
    },

    /// A query succeeded but the reported version could not be parsed.
    #[error("could not read a version for '{package}' from '{output}'")]
    UnparseableOutput { package: String, output: String },

    /// Every backend in a fallback chain failed.
    #[error("all backends failed: {}", join_errors(.errors))]
    Exhausted { errors: Vec<ProviderError> },

    /// Anything else a provider wants to report.
    #[error("{0}")]
    Other(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

fn join_errors(errors: &[ProviderError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
