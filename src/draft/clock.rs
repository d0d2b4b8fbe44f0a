//! Timing helpers: countdown formatting, start-time waits and run estimates.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_PICK_DELAY_SECS: f64 = 10.0;
pub const MIN_PICK_DELAY_SECS: f64 = 1.0;
pub const MAX_PICK_DELAY_SECS: f64 = 3600.0;

/// Per-pick delay in seconds: non-finite falls back to the default, then clamped to [1, 3600].
pub fn clamp_pick_delay(raw: Option<f64>) -> f64 {
    let seconds = match raw {
        Some(value) if value.is_finite() => value,
        _ => DEFAULT_PICK_DELAY_SECS,
    };
    seconds.clamp(MIN_PICK_DELAY_SECS, MAX_PICK_DELAY_SECS)
}

/// Time left until `start_at`; zero when absent or already past.
pub fn start_delay(start_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    start_at
        .and_then(|start| (start - now).to_std().ok())
        .unwrap_or(Duration::ZERO)
}

/// `MM:SS.CS` countdown text.
pub fn format_countdown(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

/// `1h 2m 3s`, `2m 0s`, `5s`.
pub fn human_duration(total_seconds: f64) -> String {
    let s = if total_seconds.is_finite() {
        total_seconds.max(0.0).floor() as u64
    } else {
        0
    };
    let (h, m, sec) = (s / 3600, (s % 3600) / 60, s % 60);
    let mut parts = Vec::new();
    if h > 0 {
        parts.push(format!("{h}h"));
    }
    if m > 0 || h > 0 {
        parts.push(format!("{m}m"));
    }
    parts.push(format!("{sec}s"));
    parts.join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftEstimate {
    pub picks: usize,
    pub pick_delay_secs: f64,
    pub total_seconds: f64,
    pub duration_label: String,
    pub finish_at: DateTime<Utc>,
    /// True when no start time was given and the estimate assumes an immediate start.
    pub starts_now: bool,
}

pub fn estimate_run(
    picks: usize,
    pick_delay_secs: f64,
    start_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DraftEstimate {
    let total_seconds = pick_delay_secs * picks as f64;
    let base = start_at.unwrap_or(now);
    let finish_at = base + chrono::Duration::milliseconds((total_seconds * 1000.0) as i64);
    DraftEstimate {
        picks,
        pick_delay_secs,
        total_seconds,
        duration_label: human_duration(total_seconds),
        finish_at,
        starts_now: start_at.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn delay_is_clamped() {
        assert_eq!(clamp_pick_delay(None), 10.0);
        assert_eq!(clamp_pick_delay(Some(f64::NAN)), 10.0);
        assert_eq!(clamp_pick_delay(Some(f64::INFINITY)), 10.0);
        assert_eq!(clamp_pick_delay(Some(0.0)), 1.0);
        assert_eq!(clamp_pick_delay(Some(99_999.0)), 3600.0);
        assert_eq!(clamp_pick_delay(Some(12.5)), 12.5);
    }

    #[test]
    fn past_start_time_means_no_wait() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 30).unwrap();
        assert_eq!(start_delay(Some(earlier), now), Duration::ZERO);
        assert_eq!(start_delay(None, now), Duration::ZERO);
        assert_eq!(start_delay(Some(later), now), Duration::from_secs(30));
    }

    #[test]
    fn countdown_and_duration_labels() {
        assert_eq!(format_countdown(0), "00:00.00");
        assert_eq!(format_countdown(61_234), "01:01.23");
        assert_eq!(human_duration(5.0), "5s");
        assert_eq!(human_duration(120.0), "2m 0s");
        assert_eq!(human_duration(3723.9), "1h 2m 3s");
        assert_eq!(human_duration(-4.0), "0s");
    }

    #[test]
    fn estimate_projects_finish() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let estimate = estimate_run(6, 10.0, None, now);
        assert_eq!(estimate.total_seconds, 60.0);
        assert_eq!(estimate.duration_label, "1m 0s");
        assert_eq!(estimate.finish_at, Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap());
        assert!(estimate.starts_now);
    }
}
