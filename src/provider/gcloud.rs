//! Google Secret Manager provider using the gcloud CLI
//!
//! Accesses a single secret version whose payload is a newline-delimited
//! `key=value` blob holding all the secrets for an application. The manager
//! filters the parsed blob down to the requested keys.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::{SecretEnvError, SecretEnvResult};
use crate::provider::{parse_env_blob, SecretMap, SecretProvider};

/// Google Secret Manager adapter
pub struct GcloudSecretProvider {
    project_id: String,
    secret_id: String,
    version: String,
}

impl GcloudSecretProvider {
    const PROVIDER_NAME: &'static str = "gcloud";

    /// Create a provider for one secret in one project, at version `latest`
    pub fn new(project_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            secret_id: secret_id.into(),
            version: "latest".to_string(),
        }
    }

    /// Pin a specific secret version instead of `latest`
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Access the secret version payload via the gcloud CLI
    async fn access_secret_version(&self) -> SecretEnvResult<String> {
        info!(
            "Accessing secret {}/{} (version {})",
            self.project_id, self.secret_id, self.version
        );

        let output = Command::new("gcloud")
            .args([
                "secrets",
                "versions",
                "access",
                &self.version,
                "--secret",
                &self.secret_id,
                "--project",
                &self.project_id,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SecretEnvError::command_failed("gcloud secrets versions access", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not logged in") || stderr.contains("no active account") {
                return Err(SecretEnvError::ProviderNotAuthenticated {
                    provider: Self::PROVIDER_NAME.to_string(),
                    hint: "Run: gcloud auth login".to_string(),
                });
            }
            return Err(SecretEnvError::command_exec(
                "gcloud secrets versions access",
                stderr.to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Check if gcloud is authenticated
    pub async fn is_authenticated() -> bool {
        let result = Command::new("gcloud")
            .args(["auth", "print-identity-token"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        result.map(|s| s.success()).unwrap_or(false)
    }
}

#[async_trait]
impl SecretProvider for GcloudSecretProvider {
    async fn fetch_secrets(&self, _keys: &[String]) -> SecretEnvResult<SecretMap> {
        let payload = self.access_secret_version().await?;

        if payload.trim().is_empty() {
            return Err(SecretEnvError::EmptySecretPayload {
                provider: Self::PROVIDER_NAME.to_string(),
            });
        }

        Ok(parse_env_blob(&payload))
    }
}
