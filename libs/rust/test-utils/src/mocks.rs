//! Mock implementations for testing.
//!
//! This module provides a scripted credential provider that records every
//! call, so timing and failure policies can be asserted without STS.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use sts_credentials::{CredentialProvider, Credentials, ProviderError, ProviderResult, RoleSpec};
use tokio::sync::watch;

/// What the next `acquire` call does.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Issue credentials valid for the given lifetime
    Issue(TimeDelta),
    /// Fail with a session setup error
    FailSession(String),
    /// Fail with an identity resolution error
    FailIdentity(String),
    /// Fail with a credential exchange error
    FailExchange(String),
}

/// One recorded `acquire` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Tokio clock reading, which follows paused test time
    pub at: tokio::time::Instant,
    /// Role requested
    pub role: String,
    /// Whether credentials were issued
    pub succeeded: bool,
}

#[derive(Debug)]
struct Inner {
    script: Mutex<VecDeque<MockOutcome>>,
    default_lifetime: TimeDelta,
    delay: Duration,
    calls: Mutex<Vec<MockCall>>,
    call_count: watch::Sender<usize>,
}

/// Scripted credential provider.
///
/// Outcomes queued with [`then`](Self::then) are consumed in order; once the
/// script is empty every call issues credentials with the default lifetime.
#[derive(Debug, Clone)]
pub struct MockCredentialProvider {
    inner: Arc<Inner>,
}

impl MockCredentialProvider {
    /// Create a provider issuing credentials valid for `default_lifetime`.
    #[must_use]
    pub fn new(default_lifetime: TimeDelta) -> Self {
        let (call_count, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(VecDeque::new()),
                default_lifetime,
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
                call_count,
            }),
        }
    }

    /// Make every call take `delay` before answering.
    ///
    /// # Panics
    ///
    /// Panics if the provider has already been cloned.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("configure the delay before cloning the provider")
            .delay = delay;
        self
    }

    /// Queue an outcome.
    #[must_use]
    pub fn then(self, outcome: MockOutcome) -> Self {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    /// Snapshot of recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.inner.call_count.borrow()
    }

    /// Wait until at least `n` calls have been made.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.inner.call_count.subscribe();
        // The sender lives in `inner`, so the channel cannot close while we hold `self`.
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    fn next_outcome(&self) -> MockOutcome {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(MockOutcome::Issue(self.inner.default_lifetime))
    }

    fn record(&self, role: &str, succeeded: bool) {
        let mut calls = self
            .inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        calls.push(MockCall {
            at: tokio::time::Instant::now(),
            role: role.to_string(),
            succeeded,
        });
        let count = calls.len();
        drop(calls);
        self.inner.call_count.send_replace(count);
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn acquire(&self, spec: &RoleSpec) -> ProviderResult<Credentials> {
        if !self.inner.delay.is_zero() {
            tokio::time::sleep(self.inner.delay).await;
        }
        let serial = self.call_count() + 1;
        let result = match self.next_outcome() {
            MockOutcome::Issue(lifetime) => {
                let issued_at = Utc::now();
                Credentials::new(
                    format!("ASIAMOCK{serial:08}"),
                    format!("mock-secret-{serial}"),
                    format!("mock-token-{serial}"),
                    issued_at,
                    issued_at + lifetime,
                )
            }
            MockOutcome::FailSession(msg) => Err(ProviderError::session(msg)),
            MockOutcome::FailIdentity(msg) => Err(ProviderError::identity(msg)),
            MockOutcome::FailExchange(msg) => Err(ProviderError::exchange(msg)),
        };

        self.record(&spec.role, result.is_ok());
        result
    }
}
