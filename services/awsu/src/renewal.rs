//! Background credential renewal.
//!
//! The scheduler owns the credential store and the next renewal instant.
//! It renews at 80% of each credential's lifetime and, when renewal fails,
//! tries again one minute later for as long as the process lives. Failures
//! are logged and never reach the supervised child.

use crate::error::AwsuResult;
use crate::store::CredentialStore;
use chrono::{DateTime, TimeDelta, Utc};
use rust_common::human_duration;
use std::path::Path;
use std::time::Duration;
use sts_credentials::{CredentialProvider, Credentials, RoleSpec};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Delay before retrying a failed renewal.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Renews credentials before they expire and republishes them.
pub struct RenewalScheduler<P> {
    provider: P,
    spec: RoleSpec,
    store: CredentialStore,
    next_renewal_at: DateTime<Utc>,
}

impl<P: CredentialProvider> RenewalScheduler<P> {
    /// Acquire and publish the first credentials, then plan their renewal.
    ///
    /// # Errors
    ///
    /// Returns the provider or storage error; the caller treats it as fatal.
    pub async fn start(provider: P, spec: RoleSpec, store: CredentialStore) -> AwsuResult<Self> {
        let creds = acquire_and_publish(&provider, &spec, &store).await?;
        Ok(Self {
            next_renewal_at: creds.renewal_plan().next_renewal_at(),
            provider,
            spec,
            store,
        })
    }

    /// Path of the published credentials file.
    #[must_use]
    pub fn location(&self) -> &Path {
        self.store.location()
    }

    /// When the next renewal attempt is due.
    #[must_use]
    pub const fn next_renewal_at(&self) -> DateTime<Utc> {
        self.next_renewal_at
    }

    /// Time left until the next attempt, zero if overdue.
    #[must_use]
    pub fn time_until_renewal(&self) -> Duration {
        (self.next_renewal_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Run one renewal attempt and schedule the next one.
    ///
    /// On success the next attempt follows the new credentials' plan; on
    /// failure it is [`RETRY_BACKOFF`] from now.
    ///
    /// # Errors
    ///
    /// Returns the provider or storage error after rescheduling.
    pub async fn renew_once(&mut self) -> AwsuResult<()> {
        match acquire_and_publish(&self.provider, &self.spec, &self.store).await {
            Ok(creds) => {
                self.next_renewal_at = creds.renewal_plan().next_renewal_at();
                Ok(())
            }
            Err(e) => {
                self.next_renewal_at = Utc::now() + retry_backoff();
                Err(e)
            }
        }
    }

    /// Renew forever. Only returns by being dropped with its task.
    pub async fn run(mut self) {
        loop {
            tokio::time::sleep(self.time_until_renewal()).await;

            debug!("Renewing credentials");
            match self.renew_once().await {
                Ok(()) => debug!(
                    next_renewal_in = %human_duration(self.time_until_renewal()),
                    "Credentials renewed"
                ),
                Err(e) => warn!(
                    error = %e,
                    retry_in = %human_duration(RETRY_BACKOFF),
                    "Failed to renew credentials"
                ),
            }
        }
    }
}

impl<P: CredentialProvider + 'static> RenewalScheduler<P> {
    /// Spawn [`run`](Self::run) on the current runtime.
    ///
    /// The task is never joined: it lives until the runtime is dropped, which
    /// also drops the store and removes the temporary directory. Publishing is
    /// synchronous, so on a current-thread runtime the task can only be dropped
    /// between publishes.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            renewal_in = %human_duration(self.time_until_renewal()),
            "Starting credential renewal"
        );
        tokio::spawn(self.run())
    }
}

async fn acquire_and_publish<P: CredentialProvider>(
    provider: &P,
    spec: &RoleSpec,
    store: &CredentialStore,
) -> AwsuResult<Credentials> {
    let creds = provider.acquire(spec).await?;
    store.publish(&creds)?;
    Ok(creds)
}

fn retry_backoff() -> TimeDelta {
    TimeDelta::from_std(RETRY_BACKOFF).unwrap_or(TimeDelta::minutes(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AwsuError;
    use crate::store::StoreError;
    use test_utils::{MockCredentialProvider, MockOutcome};

    fn store() -> CredentialStore {
        CredentialStore::create("default").unwrap()
    }

    #[tokio::test]
    async fn test_start_publishes_and_plans() {
        let provider = MockCredentialProvider::new(TimeDelta::seconds(100));
        let scheduler = RenewalScheduler::start(provider, RoleSpec::new("deploy"), store())
            .await
            .unwrap();

        let contents = std::fs::read_to_string(scheduler.location()).unwrap();
        assert!(contents.starts_with("[default]\naws_access_key_id=ASIAMOCK00000001\n"));

        let until = scheduler.time_until_renewal();
        assert!(until <= Duration::from_secs(80));
        assert!(until > Duration::from_secs(79));
    }

    #[tokio::test]
    async fn test_start_failure_is_reported() {
        let provider = MockCredentialProvider::new(TimeDelta::seconds(100))
            .then(MockOutcome::FailIdentity("ExpiredToken".to_string()));

        let result = RenewalScheduler::start(provider, RoleSpec::new("deploy"), store()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_start_fails_when_publish_fails() {
        let store = store();
        std::fs::remove_dir(store.location().parent().unwrap()).unwrap();
        let provider = MockCredentialProvider::new(TimeDelta::hours(1));

        let result = RenewalScheduler::start(provider.clone(), RoleSpec::new("deploy"), store).await;

        assert!(matches!(
            result,
            Err(AwsuError::Storage(StoreError::Write { .. }))
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_renewal_backs_off_one_minute() {
        let provider = MockCredentialProvider::new(TimeDelta::hours(1))
            .then(MockOutcome::Issue(TimeDelta::hours(1)))
            .then(MockOutcome::FailExchange("Throttling".to_string()));
        let mut scheduler = RenewalScheduler::start(provider, RoleSpec::new("deploy"), store())
            .await
            .unwrap();
        let published = std::fs::read_to_string(scheduler.location()).unwrap();

        let before = Utc::now();
        assert!(scheduler.renew_once().await.is_err());
        let after = Utc::now();

        assert!(scheduler.next_renewal_at() >= before + TimeDelta::minutes(1));
        assert!(scheduler.next_renewal_at() <= after + TimeDelta::minutes(1));
        assert_eq!(
            std::fs::read_to_string(scheduler.location()).unwrap(),
            published
        );
    }

    #[tokio::test]
    async fn test_successful_renewal_follows_new_plan() {
        let provider = MockCredentialProvider::new(TimeDelta::hours(1))
            .then(MockOutcome::Issue(TimeDelta::seconds(100)))
            .then(MockOutcome::Issue(TimeDelta::seconds(1000)));
        let mut scheduler = RenewalScheduler::start(provider, RoleSpec::new("deploy"), store())
            .await
            .unwrap();

        scheduler.renew_once().await.unwrap();

        let until = scheduler.time_until_renewal();
        assert!(until > Duration::from_secs(799));
        assert!(until <= Duration::from_secs(800));
        let contents = std::fs::read_to_string(scheduler.location()).unwrap();
        assert!(contents.contains("aws_access_key_id=ASIAMOCK00000002"));
    }
}
