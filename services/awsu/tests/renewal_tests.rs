//! Renewal scheduling tests on a paused tokio clock.
//!
//! The scheduler sleeps on the tokio timer, so pausing time lets the
//! 80%-of-lifetime and one-minute retry intervals be observed exactly
//! through the mock provider's recorded call instants.

use awsu::{CredentialStore, RenewalScheduler};
use chrono::TimeDelta;
use std::time::Duration;
use sts_credentials::RoleSpec;
use test_utils::{MockCredentialProvider, MockOutcome};

fn assert_near(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(500);
    assert!(
        actual + slack >= expected && actual <= expected + slack,
        "expected about {expected:?}, got {actual:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn renews_at_eighty_percent_of_lifetime() {
    let provider = MockCredentialProvider::new(TimeDelta::seconds(100));
    let store = CredentialStore::create("default").unwrap();
    let scheduler = RenewalScheduler::start(provider.clone(), RoleSpec::new("deploy"), store)
        .await
        .unwrap();
    let location = scheduler.location().to_path_buf();

    let task = scheduler.spawn();
    provider.wait_for_calls(3).await;
    tokio::task::yield_now().await;

    let calls = provider.calls();
    assert!(calls.iter().all(|c| c.succeeded));
    assert_near(calls[1].at - calls[0].at, Duration::from_secs(80));
    assert_near(calls[2].at - calls[1].at, Duration::from_secs(80));

    let contents = std::fs::read_to_string(&location).unwrap();
    assert!(contents.contains("aws_access_key_id=ASIAMOCK00000003"));

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn failed_renewal_retries_one_minute_later() {
    let provider = MockCredentialProvider::new(TimeDelta::seconds(100))
        .then(MockOutcome::Issue(TimeDelta::seconds(100)))
        .then(MockOutcome::FailExchange("Throttling".to_string()))
        .then(MockOutcome::FailIdentity("RequestExpired".to_string()));
    let store = CredentialStore::create("default").unwrap();
    let scheduler = RenewalScheduler::start(provider.clone(), RoleSpec::new("deploy"), store)
        .await
        .unwrap();
    let location = scheduler.location().to_path_buf();

    let task = scheduler.spawn();
    provider.wait_for_calls(4).await;
    tokio::task::yield_now().await;

    let calls = provider.calls();
    let outcomes: Vec<bool> = calls.iter().map(|c| c.succeeded).collect();
    assert_eq!(outcomes, vec![true, false, false, true]);
    assert_near(calls[1].at - calls[0].at, Duration::from_secs(80));
    assert_near(calls[2].at - calls[1].at, Duration::from_secs(60));
    assert_near(calls[3].at - calls[2].at, Duration::from_secs(60));

    // Failures publish nothing; the next success replaces the file.
    let contents = std::fs::read_to_string(&location).unwrap();
    assert!(contents.contains("aws_access_key_id=ASIAMOCK00000004"));

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn renewal_task_keeps_running_after_failures() {
    let provider = MockCredentialProvider::new(TimeDelta::seconds(100))
        .then(MockOutcome::Issue(TimeDelta::seconds(100)))
        .then(MockOutcome::FailSession("connection refused".to_string()))
        .then(MockOutcome::FailSession("connection refused".to_string()))
        .then(MockOutcome::FailSession("connection refused".to_string()));
    let store = CredentialStore::create("default").unwrap();
    let scheduler = RenewalScheduler::start(provider.clone(), RoleSpec::new("deploy"), store)
        .await
        .unwrap();

    let task = scheduler.spawn();
    provider.wait_for_calls(5).await;

    assert!(!task.is_finished());
    assert!(provider.calls()[4].succeeded);
    task.abort();
}
