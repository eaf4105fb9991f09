//! Configuration for the secret manager
//!
//! Settings are fixed at construction time; a `SecretManager` never mutates
//! its configuration. Config can be built in code or loaded from a TOML file.

use crate::error::{SecretEnvError, SecretEnvResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the cache file inside the cache directory
const CACHE_FILE_NAME: &str = ".env.secret";

/// Name of the companion script that removes the cache file
const REMOVE_SCRIPT_NAME: &str = "remove-secret.sh";

/// Configuration for a [`SecretManager`](crate::SecretManager)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretManagerConfig {
    /// Enable the whole resolution pipeline. When false, resolution is a no-op.
    pub enable: bool,

    /// Read and write the on-disk secret cache
    pub use_cache: bool,

    /// Cache file location override. Defaults to `{cache_dir}/secretenv/.env.secret`.
    pub env_path: Option<PathBuf>,

    /// Key material for encrypting cached values. Absent means the cache is
    /// written in plaintext.
    pub hash_key: Option<String>,

    /// Promote diagnostic messages from debug to info level
    pub debug: bool,
}

impl Default for SecretManagerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            use_cache: true,
            env_path: None,
            hash_key: None,
            debug: true,
        }
    }
}

impl SecretManagerConfig {
    /// Get the default cache directory
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("secretenv")
    }

    /// Resolve the cache file path, applying the `env_path` override
    pub fn cache_file_path(&self) -> PathBuf {
        self.env_path
            .clone()
            .unwrap_or_else(|| Self::default_cache_dir().join(CACHE_FILE_NAME))
    }

    /// Resolve the removal script path, a sibling of the cache file
    pub fn remove_script_path(&self) -> PathBuf {
        let cache_file = self.cache_file_path();
        match cache_file.parent() {
            Some(dir) => dir.join(REMOVE_SCRIPT_NAME),
            None => PathBuf::from(REMOVE_SCRIPT_NAME),
        }
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> SecretEnvResult<Self> {
        if !path.exists() {
            return Err(SecretEnvError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SecretEnvError::io(format!("reading config from {}", path.display()), e))?;

        debug!("Loaded secret manager config from {}", path.display());
        toml::from_str(&content).map_err(|e| SecretEnvError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
