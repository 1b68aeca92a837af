use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One of the five obligatory daily prayers, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn time_key(&self) -> TimeKey {
        match self {
            Prayer::Fajr => TimeKey::Fajr,
            Prayer::Dhuhr => TimeKey::Dhuhr,
            Prayer::Asr => TimeKey::Asr,
            Prayer::Maghrib => TimeKey::Maghrib,
            Prayer::Isha => TimeKey::Isha,
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prayer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fajr" => Ok(Prayer::Fajr),
            "dhuhr" | "zuhr" => Ok(Prayer::Dhuhr),
            "asr" => Ok(Prayer::Asr),
            "maghrib" => Ok(Prayer::Maghrib),
            "isha" => Ok(Prayer::Isha),
            other => Err(ValidationError::invalid(
                "prayer",
                format!("unknown prayer '{other}'"),
            )),
        }
    }
}

/// Every named instant of a day: the five prayers, sunrise, and the two
/// night markers derived from the maghrib to next-fajr interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeKey {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    MiddleOfNight,
    LastThirdOfNight,
}

impl TimeKey {
    pub const ALL: [TimeKey; 8] = [
        TimeKey::Fajr,
        TimeKey::Sunrise,
        TimeKey::Dhuhr,
        TimeKey::Asr,
        TimeKey::Maghrib,
        TimeKey::Isha,
        TimeKey::MiddleOfNight,
        TimeKey::LastThirdOfNight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeKey::Fajr => "fajr",
            TimeKey::Sunrise => "sunrise",
            TimeKey::Dhuhr => "dhuhr",
            TimeKey::Asr => "asr",
            TimeKey::Maghrib => "maghrib",
            TimeKey::Isha => "isha",
            TimeKey::MiddleOfNight => "middle_of_night",
            TimeKey::LastThirdOfNight => "last_third_of_night",
        }
    }

    /// The obligatory prayer behind this instant, if any.
    pub fn prayer(&self) -> Option<Prayer> {
        match self {
            TimeKey::Fajr => Some(Prayer::Fajr),
            TimeKey::Dhuhr => Some(Prayer::Dhuhr),
            TimeKey::Asr => Some(Prayer::Asr),
            TimeKey::Maghrib => Some(Prayer::Maghrib),
            TimeKey::Isha => Some(Prayer::Isha),
            _ => None,
        }
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
