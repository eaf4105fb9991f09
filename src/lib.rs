//! secretenv - Remote secrets into the process environment
//!
//! Fetches named secrets from a remote secret store and assigns them as
//! environment variables, with an optional AES-256-CBC-encrypted file cache
//! so repeated startups skip the remote call.
//!
//! ```no_run
//! use secretenv::{GcloudSecretProvider, SecretManager, SecretManagerConfig};
//!
//! # async fn run() -> secretenv::SecretEnvResult<()> {
//! let provider = GcloudSecretProvider::new("my-project", "app-secrets");
//! let config = SecretManagerConfig {
//!     hash_key: Some("k1".to_string()),
//!     ..Default::default()
//! };
//!
//! let manager = SecretManager::new(provider, config);
//! manager.load_env(&["PORT", "DATABASE_URL"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod crypto;
pub mod env;
pub mod error;
pub mod manager;
pub mod provider;

pub use cache::{CacheRead, SecretCache};
pub use config::SecretManagerConfig;
pub use env::{EnvSink, MemoryEnv, ProcessEnv};
pub use error::{SecretEnvError, SecretEnvResult};
pub use manager::{ResolvedSecrets, SecretManager};
pub use provider::{GcloudSecretProvider, SecretMap, SecretProvider, StaticProvider};
