//! Cart engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (HTTP store only)
//! - `PULSEFIT_API_URL` - Base URL of the hosted Pulsefit platform API
//! - `PULSEFIT_API_KEY` - Platform API key
//!
//! ## Optional
//! - `PULSEFIT_CART_DEBOUNCE_MS` - Save debounce window (default: 2000)
//! - `PULSEFIT_CART_RETRY_ATTEMPTS` - Remote attempts per operation (default: 3)
//! - `PULSEFIT_CART_RETRY_BASE_MS` - Linear backoff base delay (default: 1000)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DEBOUNCE_MS: u64 = 2000;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_MS: u64 = 1000;

const MIN_API_KEY_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Timing and retry policy for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last item change before a save fires.
    pub debounce: Duration,
    /// Attempts per remote load/save sequence.
    pub retry_attempts: u32,
    /// Base delay for linear backoff (`base * attempt_number` between tries).
    pub retry_base_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
        }
    }
}

impl SyncConfig {
    /// Load tuning overrides from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            debounce: Duration::from_millis(get_parsed_or(
                "PULSEFIT_CART_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )?),
            retry_attempts: get_parsed_or("PULSEFIT_CART_RETRY_ATTEMPTS", DEFAULT_RETRY_ATTEMPTS)?,
            retry_base_delay: Duration::from_millis(get_parsed_or(
                "PULSEFIT_CART_RETRY_BASE_MS",
                DEFAULT_RETRY_BASE_MS,
            )?),
        })
    }
}

/// Connection settings for the hosted platform API.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct PlatformConfig {
    /// Base URL of the platform API (e.g., `https://api.pulsefit.app`).
    pub base_url: Url,
    /// Platform API key.
    pub api_key: SecretString,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PlatformConfig {
    /// Load platform connection settings from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, the URL is
    /// invalid, or the API key fails placeholder validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let raw_url = get_required_env("PULSEFIT_API_URL")?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PULSEFIT_API_URL".to_string(), e.to_string()))?;
        if base_url.host_str().is_none() {
            return Err(ConfigError::InvalidEnvVar(
                "PULSEFIT_API_URL".to_string(),
                "URL must have a host".to_string(),
            ));
        }

        let api_key = get_validated_secret("PULSEFIT_API_KEY")?;

        Ok(Self { base_url, api_key })
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn get_parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;
    validate_secret(name, &value)?;
    Ok(SecretString::from(value))
}

fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_API_KEY_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("looks like a placeholder (contains \"{pattern}\")"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(2000));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_secret_validation_rejects_placeholders() {
        let err = validate_secret("PULSEFIT_API_KEY", "your-api-key-here-123");
        assert!(matches!(err, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_secret_validation_rejects_short_keys() {
        let err = validate_secret("PULSEFIT_API_KEY", "abc123");
        assert!(matches!(err, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_secret_validation_accepts_opaque_keys() {
        assert!(validate_secret("PULSEFIT_API_KEY", "pk_live_8fj3k29dk3jf93j1").is_ok());
    }

    #[test]
    fn test_platform_config_debug_redacts_key() {
        let config = PlatformConfig {
            base_url: Url::parse("https://api.pulsefit.app").expect("valid url"),
            api_key: SecretString::from("pk_live_8fj3k29dk3jf93j1"),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("pk_live"));
    }
}
