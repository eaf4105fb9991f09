//! Secret resolution pipeline
//!
//! [`SecretManager`] orchestrates cache-first lookup, provider fallback, and
//! environment injection. Cache problems never fail a resolution; provider
//! failures always do.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheRead, SecretCache};
use crate::config::SecretManagerConfig;
use crate::env::{EnvSink, ProcessEnv};
use crate::error::{SecretEnvError, SecretEnvResult};
use crate::provider::SecretProvider;

/// Secret values resolved to their final string form, keyed by secret name
pub type ResolvedSecrets = BTreeMap<String, String>;

/// Loads named secrets into the process environment, caching them on disk
pub struct SecretManager {
    provider: Box<dyn SecretProvider>,
    config: SecretManagerConfig,
    cache: SecretCache,
    env: Arc<dyn EnvSink>,
}

impl SecretManager {
    /// Create a manager that injects into the real process environment
    pub fn new(provider: impl SecretProvider + 'static, config: SecretManagerConfig) -> Self {
        Self::with_env_sink(provider, config, Arc::new(ProcessEnv))
    }

    /// Create a manager with a custom environment sink.
    ///
    /// Used by tests and by embedders that want resolved values somewhere
    /// other than the process environment.
    pub fn with_env_sink(
        provider: impl SecretProvider + 'static,
        config: SecretManagerConfig,
        env: Arc<dyn EnvSink>,
    ) -> Self {
        let cache = SecretCache::new(&config);
        Self {
            provider: Box::new(provider),
            config,
            cache,
            env,
        }
    }

    /// Resolve the given keys and assign their values into the environment.
    ///
    /// Keys the provider does not return stay unset; that is a silent partial
    /// success, not an error. When the pipeline is disabled or `keys` is
    /// empty, this is a complete no-op: no cache read, no provider call, no
    /// environment mutation.
    pub async fn load_env<S: AsRef<str>>(&self, keys: &[S]) -> SecretEnvResult<()> {
        if !self.config.enable || keys.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        validate_keys(&keys)?;

        let resolved = self.resolve(&keys).await?;
        for key in &keys {
            if let Some(value) = resolved.get(key) {
                self.env.set(key, value);
            }
        }

        Ok(())
    }

    /// Resolve keys cache-first, falling back to the provider.
    ///
    /// Every requested key with a defined value appears in the returned map;
    /// injection filters against the request, so a full cache hit may carry
    /// extra entries.
    async fn resolve(&self, keys: &[String]) -> SecretEnvResult<ResolvedSecrets> {
        let prior = match self.cache.read().await {
            CacheRead::Hit(cached) => {
                if keys.iter().all(|key| cached.contains_key(key)) {
                    self.diag("Serving secrets from cache");
                    return Ok(cached);
                }
                Some(cached)
            }
            CacheRead::Miss => None,
            CacheRead::Corrupt => {
                self.diag("Discarding unreadable secret cache");
                None
            }
        };

        self.diag("Getting secrets from provider");
        let fetched = self.provider.fetch_secrets(keys).await?;

        let mut fresh = ResolvedSecrets::new();
        for key in keys {
            if let Some(value) = fetched.get(key).and_then(scalar_to_string) {
                fresh.insert(key.clone(), value);
            } else {
                debug!("Provider returned no value for {key}");
            }
        }

        self.persist(prior, &fresh).await;
        Ok(fresh)
    }

    /// Merge freshly resolved values over the readable prior cache contents
    /// and write the union back.
    ///
    /// A write failure degrades to success-without-caching: the provider
    /// fetch already succeeded, so the caller still gets its environment.
    async fn persist(&self, prior: Option<ResolvedSecrets>, fresh: &ResolvedSecrets) {
        if !self.cache.is_enabled() {
            return;
        }

        let mut union = prior.unwrap_or_default();
        union.extend(fresh.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Err(e) = self.cache.write(&union).await {
            warn!("Failed to persist secret cache: {e}");
        }
    }

    fn diag(&self, msg: &str) {
        if self.config.debug {
            info!("{msg}");
        } else {
            debug!("{msg}");
        }
    }
}

/// Reject empty and duplicate keys before any I/O happens
fn validate_keys(keys: &[String]) -> SecretEnvResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if key.is_empty() {
            return Err(SecretEnvError::EmptySecretKey);
        }
        if !seen.insert(key.as_str()) {
            return Err(SecretEnvError::DuplicateSecretKey(key.clone()));
        }
    }
    Ok(())
}

/// Coerce a provider scalar to its environment string form.
///
/// Strings pass through verbatim, other scalars use their JSON text, and
/// null counts as absent.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
