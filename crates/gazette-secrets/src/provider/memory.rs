//! In-memory secret provider backed by a fixed map.
//!
//! Used for fixtures and tests, and for deployments where the full secret
//! set is injected at startup (e.g. mounted-file bootstrap).

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{SecretError, SecretProvider, SecretResult, SecretValue};

/// Secret provider that serves values from an in-memory map.
#[derive(Debug, Default)]
pub struct MemorySecretProvider {
    values: HashMap<String, Vec<u8>>,
}

impl MemorySecretProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, replacing any existing value for the name.
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretProvider for MemorySecretProvider {
    async fn get_secret(&self, name: &str) -> SecretResult<SecretValue> {
        self.values
            .get(name)
            .map(|value| SecretValue::new(name, value.clone()))
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }

    fn provider_kind(&self) -> &'static str {
        "memory"
    }
}
