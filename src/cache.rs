//! On-disk secret cache
//!
//! The cache is a single newline-delimited `key=value` file, optionally
//! encrypted per value, plus a companion shell script that removes the cache
//! file out-of-band. Reads never fail: anything wrong with the file degrades
//! to a miss so resolution falls through to the provider.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::config::SecretManagerConfig;
use crate::crypto::ValueCipher;
use crate::error::{SecretEnvError, SecretEnvResult};

/// Outcome of a cache read.
///
/// `Corrupt` carries the same meaning as `Miss` for resolution, but keeps
/// the "we discarded an unreadable cache" case distinct for logging.
#[derive(Debug)]
pub enum CacheRead {
    /// Cache file parsed and decrypted cleanly
    Hit(BTreeMap<String, String>),

    /// Caching disabled or cache file absent
    Miss,

    /// Cache file present but unreadable (decrypt mismatch, malformed lines)
    Corrupt,
}

/// File-backed secret cache
pub struct SecretCache {
    enabled: bool,
    cache_file: PathBuf,
    remove_script: PathBuf,
    cipher: ValueCipher,
}

impl SecretCache {
    /// Create a cache from manager configuration
    pub fn new(config: &SecretManagerConfig) -> Self {
        Self {
            enabled: config.use_cache,
            cache_file: config.cache_file_path(),
            remove_script: config.remove_script_path(),
            cipher: ValueCipher::new(config.hash_key.as_deref()),
        }
    }

    /// Whether cache reads and writes are enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read and decrypt the cache file.
    ///
    /// Never returns an error; every failure mode maps to [`CacheRead::Miss`]
    /// or [`CacheRead::Corrupt`].
    pub async fn read(&self) -> CacheRead {
        if !self.enabled {
            return CacheRead::Miss;
        }

        let data = match fs::read_to_string(&self.cache_file).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Secret cache file not found at {}", self.cache_file.display());
                return CacheRead::Miss;
            }
            Err(e) => {
                debug!("Secret cache unreadable: {e}");
                return CacheRead::Corrupt;
            }
        };

        let mut entries = BTreeMap::new();
        for line in data.lines() {
            if line.is_empty() {
                continue;
            }

            let Some((key, stored)) = line.split_once('=') else {
                debug!("Malformed line in secret cache, discarding cache");
                return CacheRead::Corrupt;
            };

            match self.cipher.decrypt(stored) {
                Ok(value) => {
                    entries.insert(key.to_string(), value);
                }
                Err(e) => {
                    debug!("Secret cache decrypt failed ({e}), discarding cache");
                    return CacheRead::Corrupt;
                }
            }
        }

        CacheRead::Hit(entries)
    }

    /// Encrypt and persist the full entry set, replacing prior file contents.
    ///
    /// The removal script is written concurrently alongside the cache file.
    /// No-op when caching is disabled.
    pub async fn write(&self, entries: &BTreeMap<String, String>) -> SecretEnvResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if let Some(dir) = self.cache_file.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| SecretEnvError::CacheDirCreate {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }

        let data = entries
            .iter()
            .map(|(key, value)| format!("{key}={}", self.cipher.encrypt(value)))
            .collect::<Vec<_>>()
            .join("\n");

        let script = format!(
            "if [ -f \"{path}\" ]; then\n  rm \"{path}\"\nfi\n",
            path = self.cache_file.display()
        );

        tokio::try_join!(
            async {
                fs::write(&self.cache_file, data).await.map_err(|e| {
                    SecretEnvError::io(
                        format!("writing secret cache {}", self.cache_file.display()),
                        e,
                    )
                })
            },
            async {
                fs::write(&self.remove_script, script).await.map_err(|e| {
                    SecretEnvError::io(
                        format!("writing removal script {}", self.remove_script.display()),
                        e,
                    )
                })
            },
        )?;

        debug!(
            "Cached {} secret(s) to {}",
            entries.len(),
            self.cache_file.display()
        );
        Ok(())
    }
}
