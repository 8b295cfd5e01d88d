//! AWS STS credential acquisition for awsu.
//!
//! Provides role assumption behind a provider trait, plus the renewal
//! plan derived from each credential's lifetime.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod role;

pub use client::StsCredentialProvider;
pub use config::RoleSpec;
pub use credentials::{Credentials, RenewalPlan};
pub use error::{ProviderError, ProviderResult};
pub use provider::CredentialProvider;
