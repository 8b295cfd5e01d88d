//! Generic credential provider trait.

use crate::config::RoleSpec;
use crate::credentials::Credentials;
use crate::error::ProviderResult;
use async_trait::async_trait;

/// Source of temporary credentials for a role.
///
/// Implementations perform one exchange per call and never retry internally;
/// retry policy belongs to the caller.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Exchange the caller's identity for credentials of `spec.role`.
    async fn acquire(&self, spec: &RoleSpec) -> ProviderResult<Credentials>;
}
