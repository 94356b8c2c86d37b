//! Human-readable duration formatting
//!
//! Used for countdowns and elapsed-time log fields.

use std::time::Duration;

/// Format a duration into a human-readable string
///
/// Leading zero units are dropped; sub-second durations render in
/// milliseconds.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "foundation")]
/// # {
/// use std::time::Duration;
///
/// use autopost_common::time::format::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5)), "5s");
/// assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// # }
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let components = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")];
    let start_index =
        components.iter().position(|(value, _)| *value > 0).unwrap_or(components.len() - 1);

    components[start_index..]
        .iter()
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format the time left until a deadline, truncated to whole seconds
///
/// Unlike [`format_duration`] this never shows milliseconds, so a countdown
/// ticking once per second reads `"39m 59s"`, `"1s"`, then `"0s"`.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "foundation")]
/// # {
/// use std::time::Duration;
///
/// use autopost_common::time::format::format_remaining;
///
/// assert_eq!(format_remaining(Duration::from_millis(2_399_900)), "39m 59s");
/// assert_eq!(format_remaining(Duration::from_millis(400)), "0s");
/// # }
/// ```
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }
    format_duration(Duration::from_secs(secs))
}
