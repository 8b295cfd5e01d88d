//! Child environment sanitisation.
//!
//! Every `AWS_` variable is stripped from the parent environment so the
//! published profile takes precedence over ambient credentials. Region and
//! profile selection survive, and a single `AWS_SHARED_CREDENTIALS_FILE`
//! pointing at the store is appended.

use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Variable naming the shared-credentials file the child should read.
pub const CREDENTIALS_FILE_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Variable selecting the active profile.
pub const PROFILE_VAR: &str = "AWS_PROFILE";

/// Profile used when the parent does not select one.
pub const DEFAULT_PROFILE: &str = "default";

const NAMESPACE_PREFIX: &[u8] = b"AWS_";

/// Namespaced variables passed through unchanged.
pub const PASSTHROUGH_VARS: [&str; 3] = ["AWS_REGION", "AWS_DEFAULT_REGION", PROFILE_VAR];

/// Whether `name` is removed from the child environment.
#[must_use]
pub fn is_stripped(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(NAMESPACE_PREFIX)
        && !PASSTHROUGH_VARS.iter().any(|allowed| name == OsStr::new(allowed))
}

/// Build the child environment from `parent`, pointing it at `credentials_file`.
pub fn sanitize<I, K, V>(parent: I, credentials_file: &Path) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: Vec<(OsString, OsString)> = parent
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, _)| !is_stripped(k))
        .collect();

    env.push((
        OsString::from(CREDENTIALS_FILE_VAR),
        credentials_file.as_os_str().to_owned(),
    ));
    env
}

/// Profile the child will look up: the parent's non-empty `AWS_PROFILE`, else `default`.
#[must_use]
pub fn active_profile(parent: &[(OsString, OsString)]) -> String {
    parent
        .iter()
        .rev()
        .find(|(k, _)| k == PROFILE_VAR)
        .and_then(|(_, v)| v.to_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_PROFILE)
        .to_string()
}
