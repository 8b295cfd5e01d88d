//! Shared proptest generators for awsu domain types.

use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use sts_credentials::Credentials;

/// Generate issue instants between 2000 and 2100.
pub fn issued_at_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800).prop_map(|secs| {
        DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
    })
}

/// Generate STS-shaped session lifetimes (15 minutes to 12 hours).
pub fn lifetime_strategy() -> impl Strategy<Value = TimeDelta> {
    (900i64..=43_200).prop_map(TimeDelta::seconds)
}

/// Generate credentials with realistic key material.
pub fn credentials_strategy() -> impl Strategy<Value = Credentials> {
    (
        "ASIA[A-Z0-9]{16}",
        "[A-Za-z0-9/+]{40}",
        "[A-Za-z0-9/+=]{100,300}",
        issued_at_strategy(),
        lifetime_strategy(),
    )
        .prop_filter_map("valid lifetime", |(id, secret, token, issued, ttl)| {
            Credentials::new(id, secret, token, issued, issued + ttl).ok()
        })
}

/// Generate names of `AWS_`-prefixed variables outside the allow-list.
pub fn aws_variable_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("AWS_ACCESS_KEY_ID".to_string()),
        Just("AWS_SECRET_ACCESS_KEY".to_string()),
        Just("AWS_SESSION_TOKEN".to_string()),
        Just("AWS_SHARED_CREDENTIALS_FILE".to_string()),
        Just("AWS_CONFIG_FILE".to_string()),
        Just("AWS_REGION_OVERRIDE".to_string()),
        "AWS_[A-Z0-9_]{1,24}",
    ]
    .prop_filter("allow-listed names", |name| {
        !matches!(
            name.as_str(),
            "AWS_REGION" | "AWS_DEFAULT_REGION" | "AWS_PROFILE"
        )
    })
}

/// Generate names of variables outside the `AWS_` namespace.
pub fn plain_variable_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,20}".prop_filter("outside the AWS_ namespace", |name| {
        !name.starts_with("AWS_")
    })
}

/// Generate environment values.
pub fn variable_value_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,40}"
}
