//! Temporary credentials and their renewal plan.

use crate::error::{ProviderError, ProviderResult};
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

/// Divisor applied to the lifetime to get the renewal margin (renew at 80%).
const RENEWAL_MARGIN_DIVISOR: i32 = 5;

/// Time-bound credentials returned by a role assumption.
///
/// Secret fields are redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Credentials {
    /// Build credentials, rejecting an expiry that is not after the issue time.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::CredentialExchange`] if `expires_at <= issued_at`.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> ProviderResult<Self> {
        if expires_at <= issued_at {
            return Err(ProviderError::exchange(format!(
                "credentials expire at {expires_at} which is not after {issued_at}"
            )));
        }

        Ok(Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: SecretString::from(session_token.into()),
            issued_at,
            expires_at,
        })
    }

    /// Access key id.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key.
    #[must_use]
    pub const fn secret_access_key(&self) -> &SecretString {
        &self.secret_access_key
    }

    /// Session token.
    #[must_use]
    pub const fn session_token(&self) -> &SecretString {
        &self.session_token
    }

    /// When the credentials were received.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the credentials stop working.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Total lifetime between issue and expiry.
    #[must_use]
    pub fn lifetime(&self) -> TimeDelta {
        self.expires_at - self.issued_at
    }

    /// Renewal plan for these credentials.
    #[must_use]
    pub fn renewal_plan(&self) -> RenewalPlan {
        RenewalPlan::new(self.issued_at, self.expires_at)
    }
}

/// When to renew a credential: 80% of the way through its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPlan {
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    next_renewal_at: DateTime<Utc>,
}

impl RenewalPlan {
    /// Plan renewal for a lifetime. Callers guarantee `issued_at < expires_at`.
    #[must_use]
    pub fn new(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        // Keep the margin positive so renewal always lands strictly before expiry.
        let margin =
            ((expires_at - issued_at) / RENEWAL_MARGIN_DIVISOR).max(TimeDelta::nanoseconds(1));

        Self {
            issued_at,
            expires_at,
            next_renewal_at: expires_at - margin,
        }
    }

    /// Start of the planned lifetime.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// End of the planned lifetime.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Instant at which renewal should start.
    #[must_use]
    pub const fn next_renewal_at(&self) -> DateTime<Utc> {
        self.next_renewal_at
    }
}
