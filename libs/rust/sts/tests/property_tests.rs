//! Property-based tests for credentials and role normalisation.
//!
//! Tests validate:
//! - Renewal lands inside the credential lifetime at the 80% mark
//! - Secrets never appear in debug output
//! - Short role names are qualified, ARNs pass through

use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use secrecy::ExposeSecret;
use sts_credentials::{Credentials, RenewalPlan, role};

// Strategy for issue instants between 2000 and 2100
fn issued_at_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

// Strategy for lifetimes from one nanosecond up to twelve hours
fn lifetime_strategy() -> impl Strategy<Value = TimeDelta> {
    prop_oneof![
        (1i64..10).prop_map(TimeDelta::nanoseconds),
        (1i64..43_200_000).prop_map(TimeDelta::milliseconds),
    ]
}

fn account_strategy() -> impl Strategy<Value = String> {
    "[0-9]{12}"
}

fn role_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9+=,.@_-]{0,63}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Renewal is never before issue and always strictly before expiry.
    #[test]
    fn prop_renewal_within_lifetime(issued in issued_at_strategy(), ttl in lifetime_strategy()) {
        let expires = issued + ttl;
        let plan = RenewalPlan::new(issued, expires);

        prop_assert!(plan.issued_at() <= plan.next_renewal_at());
        prop_assert!(plan.next_renewal_at() < plan.expires_at());
    }

    /// Renewal is scheduled 20% of the lifetime before expiry.
    #[test]
    fn prop_renewal_at_eighty_percent(issued in issued_at_strategy(), ttl_ms in 1i64..43_200_000) {
        let ttl = TimeDelta::milliseconds(ttl_ms);
        let plan = RenewalPlan::new(issued, issued + ttl);

        prop_assert_eq!(plan.next_renewal_at(), issued + ttl - ttl / 5);
    }

    /// Credentials render their plan from their own lifetime.
    #[test]
    fn prop_credentials_plan_matches_lifetime(
        issued in issued_at_strategy(),
        ttl in lifetime_strategy(),
        secret in "[A-Za-z0-9/+]{40}",
        token in "[A-Za-z0-9/+=]{100,200}",
    ) {
        let creds = Credentials::new("ASIAEXAMPLE", secret.clone(), token.clone(), issued, issued + ttl).unwrap();

        prop_assert_eq!(creds.lifetime(), ttl);
        prop_assert_eq!(creds.renewal_plan(), RenewalPlan::new(issued, issued + ttl));

        let debug = format!("{creds:?}");
        prop_assert!(!debug.contains(&secret));
        prop_assert!(!debug.contains(&token));
        prop_assert_eq!(creds.session_token().expose_secret(), token.as_str());
    }

    /// Expiry at or before issue is rejected.
    #[test]
    fn prop_inverted_lifetime_rejected(issued in issued_at_strategy(), back_ms in 0i64..86_400_000) {
        let expires = issued - TimeDelta::milliseconds(back_ms);
        prop_assert!(Credentials::new("AKIA", "s", "t", issued, expires).is_err());
    }

    /// Short names are qualified with the caller's account.
    #[test]
    fn prop_short_name_qualified(account in account_strategy(), name in role_name_strategy()) {
        prop_assume!(!name.starts_with("arn:"));
        let arn = role::qualify(&name, &account);

        prop_assert_eq!(arn, format!("arn:aws:iam::{account}:role/{name}"));
    }

    /// Fully qualified identifiers are never rewritten.
    #[test]
    fn prop_arn_passthrough(account in account_strategy(), other in account_strategy(), name in role_name_strategy()) {
        let arn = role::role_arn(&other, &name);
        prop_assert_eq!(role::qualify(&arn, &account), arn);
    }
}
