//! STS-backed credential provider.

use crate::{
    config::RoleSpec,
    credentials::Credentials,
    error::{ProviderError, ProviderResult},
    provider::CredentialProvider,
    role,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, meta::region::RegionProviderChain};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_sts::{config::Region, error::DisplayErrorContext, types::Tag};
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Region used when neither the environment nor the profile names one.
const FALLBACK_REGION: &str = "us-east-1";

/// Assumes roles through AWS STS using the ambient SDK configuration.
pub struct StsCredentialProvider {
    client: aws_sdk_sts::Client,
    account: OnceCell<String>,
}

impl StsCredentialProvider {
    /// Wrap an existing STS client.
    #[must_use]
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self {
            client,
            account: OnceCell::new(),
        }
    }

    /// Load the default SDK configuration and verify a credentials source resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::SessionSetup`] when no credentials can be
    /// obtained from the default provider chain.
    pub async fn from_env() -> ProviderResult<Self> {
        let region = RegionProviderChain::default_provider().or_else(Region::new(FALLBACK_REGION));
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| ProviderError::session("no credentials provider is configured"))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| ProviderError::session(DisplayErrorContext(&e).to_string()))?;

        debug!(region = ?sdk_config.region(), "STS session established");
        Ok(Self::new(aws_sdk_sts::Client::new(&sdk_config)))
    }

    /// Fully qualified ARN for `role`, looking up the caller's account once if needed.
    async fn role_arn(&self, role_name: &str) -> ProviderResult<String> {
        if role::is_qualified(role_name) {
            return Ok(role_name.to_string());
        }

        let account = self
            .account
            .get_or_try_init(|| async {
                let identity = self
                    .client
                    .get_caller_identity()
                    .send()
                    .await
                    .map_err(|e| ProviderError::identity(DisplayErrorContext(&e).to_string()))?;
                let account = identity
                    .account()
                    .ok_or_else(|| ProviderError::identity("caller identity carried no account"))?
                    .to_string();
                info!(%account, "Resolved caller account");
                Ok::<_, ProviderError>(account)
            })
            .await?;

        Ok(role::role_arn(account, role_name))
    }
}

#[async_trait]
impl CredentialProvider for StsCredentialProvider {
    #[instrument(skip_all, fields(role = %spec.role, session = %spec.session_name))]
    async fn acquire(&self, spec: &RoleSpec) -> ProviderResult<Credentials> {
        let role_arn = self.role_arn(&spec.role).await?;

        let mut request = self
            .client
            .assume_role()
            .role_arn(&role_arn)
            .role_session_name(&spec.session_name)
            .duration_seconds(spec.duration_seconds());

        for (key, value) in &spec.tags {
            debug!(%key, %value, "Tagging session");
            let tag = Tag::builder()
                .key(key)
                .value(value)
                .build()
                .map_err(|e| ProviderError::exchange(e.to_string()))?;
            request = request.tags(tag);
        }

        if !spec.transitive_tag_keys.is_empty() {
            request = request.set_transitive_tag_keys(Some(spec.transitive_tag_keys.clone()));
        }

        if let Some(external_id) = &spec.external_id {
            request = request.external_id(external_id);
        }

        if let Some(source_identity) = &spec.source_identity {
            request = request.source_identity(source_identity);
        }

        let output = request
            .send()
            .await
            .map_err(|e| ProviderError::exchange(DisplayErrorContext(&e).to_string()))?;
        let issued_at = Utc::now();

        let creds = output
            .credentials()
            .ok_or_else(|| ProviderError::exchange("response carried no credentials"))?;
        let expiration = creds.expiration();
        let expires_at = DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
            .ok_or_else(|| ProviderError::exchange("expiration is out of range"))?;

        debug!(%role_arn, %expires_at, "Assumed role");

        Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            creds.session_token(),
            issued_at,
            expires_at,
        )
    }
}
