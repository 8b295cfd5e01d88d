//! Role identifier normalisation.

/// Prefix shared by every fully qualified resource name.
const ARN_PREFIX: &str = "arn:";

/// Whether `role` is already a fully qualified ARN.
#[must_use]
pub fn is_qualified(role: &str) -> bool {
    role.starts_with(ARN_PREFIX)
}

/// Build the IAM role ARN for `role_name` in `account`.
#[must_use]
pub fn role_arn(account: &str, role_name: &str) -> String {
    format!("arn:aws:iam::{account}:role/{role_name}")
}

/// Qualify `role` against `account` unless it already is an ARN.
#[must_use]
pub fn qualify(role: &str, account: &str) -> String {
    if is_qualified(role) {
        role.to_string()
    } else {
        role_arn(account, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_is_qualified() {
        assert_eq!(
            qualify("deploy", "123456789012"),
            "arn:aws:iam::123456789012:role/deploy"
        );
    }

    #[test]
    fn test_arn_passes_through() {
        let arn = "arn:aws:iam::210987654321:role/path/admin";
        assert_eq!(qualify(arn, "123456789012"), arn);
        assert!(is_qualified(arn));
        assert!(!is_qualified("deploy"));
    }
}
