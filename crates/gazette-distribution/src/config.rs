//! Process-wide distribution configuration parsed from environment
//! variables.

use std::env;
use std::time::Duration;

use crate::error::{DistributionError, DistributionResult};

/// Default number of additional delivery attempts after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff, in seconds.
pub const DEFAULT_BASE_BACKOFF_SECS: u64 = 2;

/// Default safety margin subtracted from issued token lifetimes, in
/// seconds.
pub const DEFAULT_TOKEN_EXPIRY_BUFFER_SECS: u64 = 60;

/// Default per-attempt HTTP timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Process-wide configuration for outbound distribution.
///
/// These values apply to every recipient; per-recipient settings live in
/// [`crate::models::RecipientConfig`].
#[derive(Debug, Clone)]
pub struct DistributionConfig {
    /// Additional attempts after a failed call (total attempts = this + 1).
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts.
    pub base_backoff_secs: u64,
    /// Safety margin subtracted from issued token lifetimes.
    pub token_expiry_buffer_secs: u64,
    /// Per-attempt HTTP timeout; bounds how long a hung recipient can
    /// block a single call.
    pub request_timeout_secs: u64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff_secs: DEFAULT_BASE_BACKOFF_SECS,
            token_expiry_buffer_secs: DEFAULT_TOKEN_EXPIRY_BUFFER_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl DistributionConfig {
    /// Parse configuration from environment variables, falling back to
    /// defaults for unset values.
    ///
    /// Variables: `GAZETTE_DELIVERY_MAX_RETRIES`,
    /// `GAZETTE_DELIVERY_BASE_BACKOFF_SECS`,
    /// `GAZETTE_TOKEN_EXPIRY_BUFFER_SECS`, `GAZETTE_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::InvalidConfig`] if a set variable does
    /// not parse as a non-negative integer.
    pub fn from_env() -> DistributionResult<Self> {
        Ok(Self {
            max_retries: parse_var("GAZETTE_DELIVERY_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            base_backoff_secs: parse_var(
                "GAZETTE_DELIVERY_BASE_BACKOFF_SECS",
                DEFAULT_BASE_BACKOFF_SECS,
            )?,
            token_expiry_buffer_secs: parse_var(
                "GAZETTE_TOKEN_EXPIRY_BUFFER_SECS",
                DEFAULT_TOKEN_EXPIRY_BUFFER_SECS,
            )?,
            request_timeout_secs: parse_var(
                "GAZETTE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        })
    }

    /// Per-attempt HTTP timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> DistributionResult<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            DistributionError::InvalidConfig(format!(
                "{name} must be a non-negative integer, got '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DistributionConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_backoff_secs, 2);
        assert_eq!(config.token_expiry_buffer_secs, 60);
        assert_eq!(config.request_timeout_secs, 10);
    }

    // One test for all env interaction: from_env reads every variable, so
    // parallel tests mutating them would race.
    #[test]
    fn from_env_reads_set_values_and_rejects_garbage() {
        std::env::set_var("GAZETTE_DELIVERY_MAX_RETRIES", "5");
        std::env::set_var("GAZETTE_REQUEST_TIMEOUT_SECS", "30");
        let config = DistributionConfig::from_env().unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout_secs, 30);
        // Unset values fall back to defaults.
        assert_eq!(config.token_expiry_buffer_secs, 60);

        std::env::set_var("GAZETTE_DELIVERY_BASE_BACKOFF_SECS", "soon");
        let err = DistributionConfig::from_env().unwrap_err();
        assert!(matches!(err, DistributionError::InvalidConfig(_)));

        std::env::remove_var("GAZETTE_DELIVERY_MAX_RETRIES");
        std::env::remove_var("GAZETTE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("GAZETTE_DELIVERY_BASE_BACKOFF_SECS");
    }
}
