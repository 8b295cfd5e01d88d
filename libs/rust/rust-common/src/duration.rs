//! Compact duration rendering for log lines.

use std::time::Duration;

/// Render a duration as whole seconds below one minute, whole minutes above.
///
/// # Examples
///
/// ```
/// use rust_common::human_duration;
/// use std::time::Duration;
///
/// assert_eq!(human_duration(Duration::from_secs(42)), "42s");
/// assert_eq!(human_duration(Duration::from_secs(2880)), "48m");
/// ```
#[must_use]
pub fn human_duration(d: Duration) -> String {
    let seconds = d.as_secs();
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m", seconds / 60)
    }
}
