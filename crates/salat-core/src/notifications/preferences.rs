use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::prayer::Prayer;

/// Signed offset of a reminder relative to the prayer instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingOffset {
    #[default]
    At,
    Before15,
    Before30,
    After15,
    After30,
}

impl TimingOffset {
    pub const ALL: [TimingOffset; 5] = [
        TimingOffset::At,
        TimingOffset::Before15,
        TimingOffset::Before30,
        TimingOffset::After15,
        TimingOffset::After30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimingOffset::At => "at",
            TimingOffset::Before15 => "before15",
            TimingOffset::Before30 => "before30",
            TimingOffset::After15 => "after15",
            TimingOffset::After30 => "after30",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            TimingOffset::At => 0,
            TimingOffset::Before15 => -15,
            TimingOffset::Before30 => -30,
            TimingOffset::After15 => 15,
            TimingOffset::After30 => 30,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    pub fn message(&self, prayer: Prayer) -> String {
        let name = prayer.display_name();
        match self {
            TimingOffset::At => format!("It's time for {name} prayer"),
            TimingOffset::Before15 | TimingOffset::Before30 => {
                format!("{name} prayer in {} minutes", -self.minutes())
            }
            TimingOffset::After15 | TimingOffset::After30 => {
                format!("{name} prayer started {} minutes ago", self.minutes())
            }
        }
    }
}

impl fmt::Display for TimingOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimingOffset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TimingOffset::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::invalid(
                    "timing",
                    format!("'{s}' is not one of at, before15, before30, after15, after30"),
                )
            })
    }
}

/// Reminder preference for one prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub prayer: Prayer,
    pub enabled: bool,
    #[serde(default)]
    pub timing: TimingOffset,
}

impl NotificationPreference {
    pub fn default_for(prayer: Prayer) -> Self {
        Self {
            prayer,
            enabled: true,
            timing: TimingOffset::At,
        }
    }
}

/// Preferences for all five prayers, one entry each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationPreferences(Vec<NotificationPreference>);

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self(
            Prayer::ALL
                .into_iter()
                .map(NotificationPreference::default_for)
                .collect(),
        )
    }
}

impl NotificationPreferences {
    pub fn new(preferences: Vec<NotificationPreference>) -> Self {
        let mut prefs = Self::default();
        for pref in preferences {
            prefs.set(pref);
        }
        prefs
    }

    /// Preference for `prayer`; prayers absent from a stored list get the default.
    pub fn get(&self, prayer: Prayer) -> NotificationPreference {
        self.0
            .iter()
            .find(|p| p.prayer == prayer)
            .copied()
            .unwrap_or_else(|| NotificationPreference::default_for(prayer))
    }

    pub fn set(&mut self, preference: NotificationPreference) {
        match self.0.iter_mut().find(|p| p.prayer == preference.prayer) {
            Some(existing) => *existing = preference,
            None => self.0.push(preference),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = NotificationPreference> + '_ {
        Prayer::ALL.into_iter().map(move |p| self.get(p))
    }

    pub fn enabled(&self) -> impl Iterator<Item = NotificationPreference> + '_ {
        self.all().filter(|p| p.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_signed_minutes() {
        assert_eq!(TimingOffset::At.minutes(), 0);
        assert_eq!(TimingOffset::Before15.minutes(), -15);
        assert_eq!(TimingOffset::After30.minutes(), 30);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("before15".parse::<TimingOffset>().unwrap(), TimingOffset::Before15);
        assert_eq!("AT".parse::<TimingOffset>().unwrap(), TimingOffset::At);
        assert!("before45".parse::<TimingOffset>().is_err());
        assert_eq!(
            serde_json::to_string(&TimingOffset::After15).unwrap(),
            "\"after15\""
        );
    }

    #[test]
    fn messages_describe_offset() {
        assert_eq!(TimingOffset::At.message(Prayer::Isha), "It's time for Isha prayer");
        assert_eq!(TimingOffset::Before30.message(Prayer::Fajr), "Fajr prayer in 30 minutes");
        assert_eq!(
            TimingOffset::After15.message(Prayer::Asr),
            "Asr prayer started 15 minutes ago"
        );
    }

    #[test]
    fn defaults_enable_every_prayer_at_time() {
        let prefs = NotificationPreferences::default();
        assert_eq!(prefs.enabled().count(), 5);
        assert!(prefs.all().all(|p| p.timing == TimingOffset::At));
    }

    #[test]
    fn partial_stored_list_fills_missing_prayers() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"[{"prayer":"dhuhr","enabled":true,"timing":"before15"}]"#)
                .unwrap();
        assert_eq!(prefs.get(Prayer::Dhuhr).timing, TimingOffset::Before15);
        assert_eq!(prefs.get(Prayer::Isha), NotificationPreference::default_for(Prayer::Isha));
        assert_eq!(prefs.all().count(), 5);
    }
}
