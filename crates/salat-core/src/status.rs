//! Per-prayer display status.
//!
//! A pure projection of the day's instants, the current instant and the day's
//! adherence record. Sunrise is informational and never projected.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::adherence::DailyAdherenceRecord;
use crate::prayer::Prayer;
use crate::times::DailyInstants;

pub const DEFAULT_CURRENT_WINDOW_MIN: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerStatus {
    pub prayer: Prayer,
    pub instant: DateTime<Utc>,
    /// Local wall-clock time, `HH:MM`.
    pub local_time: String,
    pub is_upcoming: bool,
    /// Within the fixed window either side of the prayer instant. Two
    /// prayers may both be current when they are close together.
    pub is_current: bool,
    pub logged: bool,
    pub on_time: bool,
    /// Time left until an upcoming prayer.
    pub countdown: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PrayerStatusProjector {
    current_window: Duration,
}

impl Default for PrayerStatusProjector {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_CURRENT_WINDOW_MIN))
    }
}

impl PrayerStatusProjector {
    pub fn new(current_window: Duration) -> Self {
        Self { current_window }
    }

    pub fn project(
        &self,
        instants: &DailyInstants,
        now: DateTime<Utc>,
        record: Option<&DailyAdherenceRecord>,
    ) -> Vec<PrayerStatus> {
        Prayer::ALL
            .into_iter()
            .map(|prayer| {
                let instant = instants.prayer(prayer);
                let delta = instant - now;
                let log = record.map(|r| *r.get(prayer)).unwrap_or_default();
                PrayerStatus {
                    prayer,
                    instant,
                    local_time: instant
                        .with_timezone(&instants.timezone)
                        .format("%H:%M")
                        .to_string(),
                    is_upcoming: instant > now,
                    is_current: delta <= self.current_window && -delta <= self.current_window,
                    logged: log.logged,
                    on_time: log.on_time,
                    countdown: (instant > now).then(|| format_countdown(delta)),
                }
            })
            .collect()
    }

    /// First prayer of the day still ahead of `now`, if any.
    pub fn next_prayer(instants: &DailyInstants, now: DateTime<Utc>) -> Option<(Prayer, DateTime<Utc>)> {
        Prayer::ALL
            .into_iter()
            .map(|p| (p, instants.prayer(p)))
            .find(|(_, instant)| *instant > now)
    }
}

/// "2h 5m" or "45m", truncating to whole minutes.
pub fn format_countdown(delta: Duration) -> String {
    let total_min = delta.num_milliseconds().max(0) / 60_000;
    let (hours, minutes) = (total_min / 60, total_min % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
