//! Role assumption request configuration.

use std::collections::BTreeMap;
use std::time::Duration;

/// Default role session name.
pub const DEFAULT_SESSION_NAME: &str = "awsu";

/// Default session lifetime requested from STS.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3600);

/// Everything needed to request credentials for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    /// Role name or fully qualified role ARN
    pub role: String,
    /// Role session name
    pub session_name: String,
    /// Requested session lifetime
    pub duration: Duration,
    /// External id expected by the role's trust policy
    pub external_id: Option<String>,
    /// Source identity recorded on the session
    pub source_identity: Option<String>,
    /// Session tags
    pub tags: BTreeMap<String, String>,
    /// Tag keys that propagate to chained role sessions
    pub transitive_tag_keys: Vec<String>,
}

impl RoleSpec {
    /// Create a spec for `role` with default session settings.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            duration: DEFAULT_DURATION,
            external_id: None,
            source_identity: None,
            tags: BTreeMap::new(),
            transitive_tag_keys: Vec::new(),
        }
    }

    /// Set the role session name.
    #[must_use]
    pub fn with_session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = name.into();
        self
    }

    /// Set the requested session lifetime.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the external id.
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Set the source identity.
    #[must_use]
    pub fn with_source_identity(mut self, identity: impl Into<String>) -> Self {
        self.source_identity = Some(identity.into());
        self
    }

    /// Add a session tag. A repeated key keeps the last value.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Mark a tag key as transitive.
    #[must_use]
    pub fn with_transitive_tag_key(mut self, key: impl Into<String>) -> Self {
        self.transitive_tag_keys.push(key.into());
        self
    }

    /// Session lifetime in the whole seconds STS expects, saturating at `i32::MAX`.
    #[must_use]
    pub fn duration_seconds(&self) -> i32 {
        i32::try_from(self.duration.as_secs()).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = RoleSpec::new("deploy");
        assert_eq!(spec.session_name, "awsu");
        assert_eq!(spec.duration, Duration::from_secs(3600));
        assert!(spec.external_id.is_none());
        assert!(spec.tags.is_empty());
    }

    #[test]
    fn test_builder() {
        let spec = RoleSpec::new("deploy")
            .with_session_name("ci")
            .with_duration(Duration::from_secs(900))
            .with_external_id("ext")
            .with_source_identity("alice")
            .with_tag("team", "infra")
            .with_tag("team", "platform")
            .with_transitive_tag_key("team");

        assert_eq!(spec.session_name, "ci");
        assert_eq!(spec.duration_seconds(), 900);
        assert_eq!(spec.external_id.as_deref(), Some("ext"));
        assert_eq!(spec.source_identity.as_deref(), Some("alice"));
        assert_eq!(spec.tags.get("team").map(String::as_str), Some("platform"));
        assert_eq!(spec.transitive_tag_keys, vec!["team".to_string()]);
    }

    #[test]
    fn test_duration_seconds_saturates() {
        let spec = RoleSpec::new("r").with_duration(Duration::from_secs(u64::MAX));
        assert_eq!(spec.duration_seconds(), i32::MAX);
    }
}
