//! Track time formatting for chat messages
//!
//! Durations are rendered as `mm:ss`, or `h:mm:ss` once they reach an hour.
//! Live streams report an unknown length and render as `LIVE`.

/// Duration value a backend reports for a stream with no known end
pub const LIVE_DURATION_MS: u64 = u64::MAX;

/// Format a track duration in milliseconds.
///
/// Seconds are rounded to the nearest whole second before splitting.
///
/// # Examples
///
/// ```
/// use soundq_common::human_time::{format_track_time, LIVE_DURATION_MS};
///
/// assert_eq!(format_track_time(0), "00:00");
/// assert_eq!(format_track_time(65_000), "01:05");
/// assert_eq!(format_track_time(3_723_000), "1:02:03");
/// assert_eq!(format_track_time(LIVE_DURATION_MS), "LIVE");
/// ```
pub fn format_track_time(duration_ms: u64) -> String {
    if duration_ms == LIVE_DURATION_MS {
        return "LIVE".to_string();
    }

    let total_secs = duration_ms.saturating_add(500) / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Format a configured maximum track length.
///
/// `None` means unlimited and renders as `no limit`.
///
/// # Examples
///
/// ```
/// use soundq_common::human_time::format_max_duration;
///
/// assert_eq!(format_max_duration(None), "no limit");
/// assert_eq!(format_max_duration(Some(600_000)), "10:00");
/// ```
pub fn format_max_duration(max_duration_ms: Option<u64>) -> String {
    match max_duration_ms {
        Some(ms) => format_track_time(ms),
        None => "no limit".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_tracks() {
        assert_eq!(format_track_time(0), "00:00");
        assert_eq!(format_track_time(9_000), "00:09");
        assert_eq!(format_track_time(59_000), "00:59");
        assert_eq!(format_track_time(500_000), "08:20");
    }

    #[test]
    fn test_rounding() {
        // 1.4s rounds down, 1.5s rounds up
        assert_eq!(format_track_time(1_400), "00:01");
        assert_eq!(format_track_time(1_500), "00:02");
        assert_eq!(format_track_time(59_600), "01:00");
    }

    #[test]
    fn test_hour_boundary() {
        assert_eq!(format_track_time(3_599_000), "59:59");
        assert_eq!(format_track_time(3_600_000), "1:00:00");
        assert_eq!(format_track_time(36_000_000), "10:00:00");
    }

    #[test]
    fn test_live_stream() {
        assert_eq!(format_track_time(LIVE_DURATION_MS), "LIVE");
        // Just below the sentinel is still a (very long) number
        assert_ne!(format_track_time(LIVE_DURATION_MS - 1), "LIVE");
    }

    #[test]
    fn test_max_duration() {
        assert_eq!(format_max_duration(None), "no limit");
        assert_eq!(format_max_duration(Some(1_000)), "00:01");
        assert_eq!(format_max_duration(Some(7_200_000)), "2:00:00");
    }
}
