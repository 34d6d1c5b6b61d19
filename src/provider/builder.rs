//! Assemble the provider a catalog describes.

use std::path::Path;
use std::time::Duration;

use crate::catalog::schema::CatalogConfig;
use crate::error::{ProvisionError, Result};

use super::{CommandProvider, FallbackProvider, PackageProvider, RetryProvider};

/// Build the provider for a catalog.
///
/// Each backend becomes a [`CommandProvider`]. Backends whose probe fails
/// are dropped with a warning; if none remain the run cannot start.
/// Several backends are chained with [`FallbackProvider`], and
/// `settings.retries > 1` wraps the result in [`RetryProvider`].
pub fn build_provider(
    config: &CatalogConfig,
    project_root: &Path,
) -> Result<Box<dyn PackageProvider>> {
    if config.backends.is_empty() {
        return Err(ProvisionError::CatalogValidationError {
            message: "no backends configured".to_string(),
        });
    }

    let mut available: Vec<Box<dyn PackageProvider>> = Vec::new();
    let mut unavailable = Vec::new();

    for backend in &config.backends {
        let provider = CommandProvider::new(backend.clone())?.with_cwd(project_root);
        match provider.probe() {
            Ok(()) => {
                tracing::debug!("Backend '{}' is available", backend.name);
                available.push(Box::new(provider));
            }
            Err(e) => {
                tracing::warn!("Backend '{}' skipped: {}", backend.name, e);
                unavailable.push(e.to_string());
            }
        }
    }

    let provider: Box<dyn PackageProvider> = match available.len() {
        0 => {
            return Err(ProvisionError::ProviderUnavailable {
                message: unavailable.join("; "),
            })
        }
        1 => available.remove(0),
        _ => Box::new(FallbackProvider::new(available)),
    };

    if config.settings.retries > 1 {
        Ok(Box::new(RetryProvider::new(
            provider,
            config.settings.retries,
            Duration::from_millis(config.settings.retry_delay_ms),
        )))
    } else {
        Ok(provider)
    }
}
