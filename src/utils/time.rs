//! Time utilities

use chrono::{DateTime, Utc};

/// Format a recorded time in seconds as `h:mm:ss`
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Seconds elapsed from `start` to `at`, clamped at zero
pub fn seconds_since(start: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - start).num_seconds().max(0)
}
