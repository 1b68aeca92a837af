use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::prayer::Prayer;
use crate::streak::StreakVariant;

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; embedders may forward them elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PrayerLogged {
        date: NaiveDate,
        prayer: Prayer,
        on_time: bool,
        at: DateTime<Utc>,
    },
    /// A streak variant reached a new best.
    StreakRecord {
        variant: StreakVariant,
        best_streak: u32,
        at: DateTime<Utc>,
    },
    RemindersScheduled {
        date: NaiveDate,
        created: Vec<String>,
        skipped_existing: usize,
        at: DateTime<Utc>,
    },
    ReminderFired {
        id: String,
        prayer: Prayer,
        at: DateTime<Utc>,
    },
    /// Presentation failed; the reminder stays due and is retried next tick.
    ReminderFailed {
        id: String,
        error: String,
        at: DateTime<Utc>,
    },
    ReminderCancelled {
        id: String,
        at: DateTime<Utc>,
    },
    RetentionPurged {
        removed: usize,
        at: DateTime<Utc>,
    },
    PumpStarted {
        at: DateTime<Utc>,
    },
    PumpStopped {
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::ReminderCancelled {
            id: "2024-03-01-fajr-at".into(),
            at: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ReminderCancelled");
        assert_eq!(json["id"], "2024-03-01-fajr-at");
    }
}
