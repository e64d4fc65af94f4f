//! Pluggable secret provider abstraction for the gazette platform.
//!
//! This crate defines the [`SecretProvider`] trait used wherever the
//! platform needs a credential at runtime without baking it into
//! configuration, together with two concrete providers (environment
//! variables and an in-memory map) and a TTL caching decorator.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gazette_secrets::{CachedSecretProvider, EnvSecretProvider, SecretProvider};
//!
//! let provider = CachedSecretProvider::new(Arc::new(EnvSecretProvider::default()), 300);
//! let client_id = provider.get_secret("recipient_a_client_id").await?;
//! let value = client_id.as_str()?;
//! ```

pub mod cache;
pub mod provider;

pub use cache::CachedSecretProvider;
pub use provider::env::EnvSecretProvider;
pub use provider::memory::MemorySecretProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Errors returned by secret provider operations.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The provider has no value for the requested name.
    #[error("secret not found: '{name}'")]
    NotFound { name: String },

    /// The backing store could not be reached or refused the request.
    #[error("secret provider '{provider}' unavailable: {detail}")]
    Unavailable { provider: String, detail: String },

    /// The stored value exists but cannot be used (wrong encoding, empty).
    #[error("invalid secret value for '{name}': {detail}")]
    InvalidValue { name: String, detail: String },
}

pub type SecretResult<T> = Result<T, SecretError>;

/// A resolved secret value returned by any provider.
#[derive(Clone)]
pub struct SecretValue {
    /// Logical secret name (e.g., "courts_api_client_id").
    pub name: String,

    /// Raw secret bytes.
    pub value: Vec<u8>,

    /// When this value was fetched from the backing store.
    pub loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl SecretValue {
    /// Create a new value stamped with the current time.
    pub fn new(name: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value,
            loaded_at: Utc::now(),
        }
    }

    /// Interpret the secret value as a UTF-8 string.
    pub fn as_str(&self) -> SecretResult<&str> {
        std::str::from_utf8(&self.value).map_err(|e| SecretError::InvalidValue {
            name: self.name.clone(),
            detail: format!("not valid UTF-8: {e}"),
        })
    }
}

/// Trait implemented by every secret backend.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Retrieve a secret by its logical name.
    ///
    /// Returns [`SecretError::NotFound`] if the provider has no value for
    /// the name.
    async fn get_secret(&self, name: &str) -> SecretResult<SecretValue>;

    /// Provider kind name for logging and diagnostics.
    fn provider_kind(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_value_as_str_valid() {
        let sv = SecretValue::new("test", b"hello".to_vec());
        assert_eq!(sv.as_str().unwrap(), "hello");
    }

    #[test]
    fn secret_value_as_str_invalid_utf8() {
        let sv = SecretValue::new("test", vec![0xFF, 0xFE]);
        match sv.as_str().unwrap_err() {
            SecretError::InvalidValue { name, detail } => {
                assert_eq!(name, "test");
                assert!(detail.contains("UTF-8"));
            }
            other => panic!("expected InvalidValue, got: {other}"),
        }
    }

    #[test]
    fn secret_value_debug_redacts() {
        let sv = SecretValue::new("test", b"super-secret".to_vec());
        let rendered = format!("{sv:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn secret_error_display() {
        let err = SecretError::NotFound {
            name: "client_id".to_string(),
        };
        assert_eq!(err.to_string(), "secret not found: 'client_id'");

        let err = SecretError::Unavailable {
            provider: "env".to_string(),
            detail: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "secret provider 'env' unavailable: permission denied"
        );
    }
}
