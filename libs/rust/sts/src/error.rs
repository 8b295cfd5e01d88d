//! Credential provider error types using thiserror 2.0.
//!
//! Each variant names the stage of the exchange that failed so callers can
//! report it without inspecting SDK internals.

use thiserror::Error;

/// Errors raised while acquiring credentials from STS.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No usable SDK session could be established
    #[error("failed to set up an STS session: {0}")]
    SessionSetup(String),

    /// The caller identity needed to qualify a short role name is unavailable
    #[error("failed to discover parent account caller identity: {0}")]
    IdentityResolution(String),

    /// STS rejected or failed the AssumeRole exchange
    #[error("failed to assume the role: {0}")]
    CredentialExchange(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Create a session setup error.
    #[must_use]
    pub fn session(msg: impl Into<String>) -> Self {
        Self::SessionSetup(msg.into())
    }

    /// Create an identity resolution error.
    #[must_use]
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::IdentityResolution(msg.into())
    }

    /// Create a credential exchange error.
    #[must_use]
    pub fn exchange(msg: impl Into<String>) -> Self {
        Self::CredentialExchange(msg.into())
    }
}
