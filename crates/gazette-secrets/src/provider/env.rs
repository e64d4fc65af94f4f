//! Environment variable secret provider.
//!
//! Maps logical secret names to environment variable names, either via an
//! explicit mapping table or by uppercasing the logical name.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{SecretError, SecretProvider, SecretResult, SecretValue};

/// Secret provider that reads secrets from environment variables.
#[derive(Debug, Default)]
pub struct EnvSecretProvider {
    /// Explicit logical name to env var name mappings.
    mappings: HashMap<String, String>,
}

impl EnvSecretProvider {
    /// Create a provider with explicit logical-name mappings.
    #[must_use]
    pub fn new(mappings: HashMap<String, String>) -> Self {
        Self { mappings }
    }

    /// Resolve a logical secret name to an environment variable name.
    ///
    /// An explicit mapping wins; otherwise the logical name is uppercased.
    fn resolve_env_var_name(&self, logical_name: &str) -> String {
        self.mappings
            .get(logical_name)
            .cloned()
            .unwrap_or_else(|| logical_name.to_uppercase())
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, name: &str) -> SecretResult<SecretValue> {
        let env_var = self.resolve_env_var_name(name);

        match std::env::var(&env_var) {
            Ok(value) if !value.is_empty() => {
                tracing::debug!(
                    secret_name = name,
                    env_var = %env_var,
                    "secret loaded from environment variable"
                );
                Ok(SecretValue::new(name, value.into_bytes()))
            }
            // Empty value treated as not found.
            _ => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn provider_kind(&self) -> &'static str {
        "env"
    }
}
