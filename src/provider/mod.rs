//! Secret providers
//!
//! A provider is a stateless fetch capability: give it a list of keys, get
//! back a map of secret values. Implementations adapt specific remote secret
//! stores; the manager does not care about transport or authentication, and
//! filters whatever a provider returns down to the requested keys.

pub mod gcloud;

pub use gcloud::GcloudSecretProvider;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::SecretEnvResult;

/// Secret values as returned by a provider, keyed by secret name.
///
/// Values are arbitrary JSON scalars; the manager coerces them to strings
/// before persisting or injecting them.
pub type SecretMap = HashMap<String, serde_json::Value>;

/// Fetch capability for a remote secret store
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch secret values for the given keys.
    ///
    /// A provider may return more or fewer keys than requested; the caller
    /// filters. Errors propagate to the caller of resolution unchanged.
    async fn fetch_secrets(&self, keys: &[String]) -> SecretEnvResult<SecretMap>;
}

/// Parse a newline-delimited `key=value` secret payload into a [`SecretMap`].
///
/// Lines without a `=` and empty lines are skipped. Values are kept as
/// strings; splitting happens at the first `=` so values may contain `=`.
pub fn parse_env_blob(payload: &str) -> SecretMap {
    payload
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), serde_json::Value::String(value.to_string())))
        })
        .collect()
}

/// Provider backed by a fixed in-memory map.
///
/// Useful for fixtures and local development where the secret values are
/// already known.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    secrets: SecretMap,
}

impl StaticProvider {
    /// Create a provider serving the given map
    pub fn new(secrets: SecretMap) -> Self {
        Self { secrets }
    }

    /// Create a provider from string pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let secrets = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        Self { secrets }
    }
}

#[async_trait]
impl SecretProvider for StaticProvider {
    async fn fetch_secrets(&self, _keys: &[String]) -> SecretEnvResult<SecretMap> {
        // The manager filters, so returning the whole map is fine
        Ok(self.secrets.clone())
    }
}
