//! Error types for secretenv
//!
//! All modules use `SecretEnvResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for secretenv operations
pub type SecretEnvResult<T> = Result<T, SecretEnvError>;

/// All errors that can occur in secretenv
#[derive(Error, Debug)]
pub enum SecretEnvError {
    // Provider errors
    #[error("Provider {provider} failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Provider {provider} is not authenticated. {hint}")]
    ProviderNotAuthenticated { provider: String, hint: String },

    #[error("Secret payload from {provider} is empty")]
    EmptySecretPayload { provider: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // Cache errors
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Crypto errors
    #[error("Failed to decrypt secret value: {0}")]
    Decrypt(String),

    // Request errors
    #[error("Secret key must not be empty")]
    EmptySecretKey,

    #[error("Duplicate secret key in request: {0}")]
    DuplicateSecretKey(String),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SecretEnvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a provider error
    pub fn provider(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Check if the error originated in a provider rather than locally
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::ProviderNotAuthenticated { .. }
                | Self::EmptySecretPayload { .. }
                | Self::CommandFailed { .. }
                | Self::CommandExecution { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ProviderNotAuthenticated { hint, .. } => Some(hint),
            Self::ConfigNotFound(_) => Some("Check the configured config path"),
            _ => None,
        }
    }
}
