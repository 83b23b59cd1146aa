//! Platform API reachability probe.
//!
//! # Usage
//!
//! ```bash
//! PULSEFIT_API_URL=https://api.pulsefit.app \
//! PULSEFIT_API_KEY=... \
//! pf-cli probe
//! ```

use thiserror::Error;
use tracing::info;

use pulsefit_cart::store::http::PlatformClient;
use pulsefit_cart::{ConfigError, PlatformConfig, RemoteCartStore, StoreError};

/// Errors that can occur while probing the platform.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The platform did not answer the health check.
    #[error("platform probe failed: {0}")]
    Probe(#[from] StoreError),
}

/// Ping the hosted platform API once and report the outcome.
///
/// # Errors
///
/// Returns `ProbeError` if configuration is missing or the health check fails.
pub async fn run() -> Result<(), ProbeError> {
    let config = PlatformConfig::from_env()?;
    info!(base_url = %config.base_url, "probing platform API");

    let client = PlatformClient::new(&config)?;
    client.ping().await?;

    info!("platform API reachable");
    Ok(())
}
