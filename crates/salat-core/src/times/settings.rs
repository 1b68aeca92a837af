//! Calculation settings and their translation into service parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::prayer::TimeKey;

/// The nine supported calculation conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    MuslimWorldLeague,
    Egyptian,
    Karachi,
    UmmAlQura,
    Dubai,
    MoonsightingCommittee,
    NorthAmerica,
    Kuwait,
    Qatar,
}

/// Jurisprudential school; only affects the Asr shadow length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Madhab {
    #[default]
    Shafi,
    Hanafi,
}

/// Fallback for latitudes where twilight never reaches the required angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighLatitudeRule {
    #[default]
    MiddleOfTheNight,
    SeventhOfTheNight,
    TwilightAngle,
}

/// Signed minute offsets applied to individual instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrayerAdjustments {
    #[serde(default)]
    pub fajr: i32,
    #[serde(default)]
    pub sunrise: i32,
    #[serde(default)]
    pub dhuhr: i32,
    #[serde(default)]
    pub asr: i32,
    #[serde(default)]
    pub maghrib: i32,
    #[serde(default)]
    pub isha: i32,
}

/// Largest accepted manual adjustment, in minutes either way.
pub const MAX_ADJUSTMENT_MIN: i32 = 120;

impl PrayerAdjustments {
    /// Minutes for one of the six canonical instants. Night markers are derived
    /// and never adjusted directly.
    pub fn minutes(&self, key: TimeKey) -> i32 {
        match key {
            TimeKey::Fajr => self.fajr,
            TimeKey::Sunrise => self.sunrise,
            TimeKey::Dhuhr => self.dhuhr,
            TimeKey::Asr => self.asr,
            TimeKey::Maghrib => self.maghrib,
            TimeKey::Isha => self.isha,
            TimeKey::MiddleOfNight | TimeKey::LastThirdOfNight => 0,
        }
    }

    pub fn set(&mut self, key: TimeKey, minutes: i32) -> Result<(), ValidationError> {
        if !(-MAX_ADJUSTMENT_MIN..=MAX_ADJUSTMENT_MIN).contains(&minutes) {
            return Err(ValidationError::OutOfRange {
                field: format!("adjustments.{key}"),
                value: minutes as f64,
                min: -MAX_ADJUSTMENT_MIN as f64,
                max: MAX_ADJUSTMENT_MIN as f64,
            });
        }
        match key {
            TimeKey::Fajr => self.fajr = minutes,
            TimeKey::Sunrise => self.sunrise = minutes,
            TimeKey::Dhuhr => self.dhuhr = minutes,
            TimeKey::Asr => self.asr = minutes,
            TimeKey::Maghrib => self.maghrib = minutes,
            TimeKey::Isha => self.isha = minutes,
            TimeKey::MiddleOfNight | TimeKey::LastThirdOfNight => {
                return Err(ValidationError::invalid(
                    "adjustments",
                    format!("{key} is derived and cannot be adjusted"),
                ))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut copy = PrayerAdjustments::default();
        for key in &TimeKey::ALL[..6] {
            copy.set(*key, self.minutes(*key))?;
        }
        Ok(())
    }

    fn combined(&self, other: &PrayerAdjustments) -> PrayerAdjustments {
        PrayerAdjustments {
            fajr: self.fajr + other.fajr,
            sunrise: self.sunrise + other.sunrise,
            dhuhr: self.dhuhr + other.dhuhr,
            asr: self.asr + other.asr,
            maghrib: self.maghrib + other.maghrib,
            isha: self.isha + other.isha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationSettings {
    #[serde(default)]
    pub method: CalculationMethod,
    #[serde(default)]
    pub madhab: Madhab,
    #[serde(default)]
    pub high_latitude_rule: HighLatitudeRule,
    #[serde(default)]
    pub adjustments: PrayerAdjustments,
}

/// Twilight parameters a method contributes to the astronomical request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodParameters {
    pub fajr_angle: f64,
    pub isha_angle: f64,
    /// Fixed minutes after maghrib, used instead of `isha_angle` when set.
    pub isha_interval_min: Option<u32>,
    pub method_adjustments: PrayerAdjustments,
}

impl CalculationMethod {
    pub const ALL: [CalculationMethod; 9] = [
        CalculationMethod::MuslimWorldLeague,
        CalculationMethod::Egyptian,
        CalculationMethod::Karachi,
        CalculationMethod::UmmAlQura,
        CalculationMethod::Dubai,
        CalculationMethod::MoonsightingCommittee,
        CalculationMethod::NorthAmerica,
        CalculationMethod::Kuwait,
        CalculationMethod::Qatar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::MuslimWorldLeague => "muslim_world_league",
            CalculationMethod::Egyptian => "egyptian",
            CalculationMethod::Karachi => "karachi",
            CalculationMethod::UmmAlQura => "umm_al_qura",
            CalculationMethod::Dubai => "dubai",
            CalculationMethod::MoonsightingCommittee => "moonsighting_committee",
            CalculationMethod::NorthAmerica => "north_america",
            CalculationMethod::Kuwait => "kuwait",
            CalculationMethod::Qatar => "qatar",
        }
    }

    pub fn parameters(&self) -> MethodParameters {
        let dhuhr_one = PrayerAdjustments {
            dhuhr: 1,
            ..Default::default()
        };
        let (fajr_angle, isha_angle, isha_interval_min, method_adjustments) = match self {
            CalculationMethod::MuslimWorldLeague => (18.0, 17.0, None, dhuhr_one),
            CalculationMethod::Egyptian => (19.5, 17.5, None, dhuhr_one),
            CalculationMethod::Karachi => (18.0, 18.0, None, dhuhr_one),
            CalculationMethod::UmmAlQura => (18.5, 0.0, Some(90), PrayerAdjustments::default()),
            CalculationMethod::Dubai => (
                18.2,
                18.2,
                None,
                PrayerAdjustments {
                    sunrise: -3,
                    dhuhr: 3,
                    asr: 3,
                    maghrib: 3,
                    ..Default::default()
                },
            ),
            CalculationMethod::MoonsightingCommittee => (
                18.0,
                18.0,
                None,
                PrayerAdjustments {
                    dhuhr: 5,
                    maghrib: 3,
                    ..Default::default()
                },
            ),
            CalculationMethod::NorthAmerica => (15.0, 15.0, None, dhuhr_one),
            CalculationMethod::Kuwait => (18.0, 17.5, None, PrayerAdjustments::default()),
            CalculationMethod::Qatar => (18.0, 0.0, Some(90), PrayerAdjustments::default()),
        };
        MethodParameters {
            fajr_angle,
            isha_angle,
            isha_interval_min,
            method_adjustments,
        }
    }
}

impl Madhab {
    /// Shadow length multiple that marks the start of Asr.
    pub fn shadow_factor(&self) -> u8 {
        match self {
            Madhab::Shafi => 1,
            Madhab::Hanafi => 2,
        }
    }
}

impl CalculationSettings {
    /// Method adjustments plus the user's own adjustments.
    pub fn total_adjustments(&self) -> PrayerAdjustments {
        self.method
            .parameters()
            .method_adjustments
            .combined(&self.adjustments)
    }
}

macro_rules! snake_case_enum_str {
    ($ty:ty, $field:literal, [$($variant:path => $name:literal),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self { $($variant => $name),+ };
                f.write_str(s)
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($name => Ok($variant),)+
                    other => Err(ValidationError::invalid(
                        $field,
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }
    };
}

snake_case_enum_str!(CalculationMethod, "method", [
    CalculationMethod::MuslimWorldLeague => "muslim_world_league",
    CalculationMethod::Egyptian => "egyptian",
    CalculationMethod::Karachi => "karachi",
    CalculationMethod::UmmAlQura => "umm_al_qura",
    CalculationMethod::Dubai => "dubai",
    CalculationMethod::MoonsightingCommittee => "moonsighting_committee",
    CalculationMethod::NorthAmerica => "north_america",
    CalculationMethod::Kuwait => "kuwait",
    CalculationMethod::Qatar => "qatar",
]);

snake_case_enum_str!(Madhab, "madhab", [
    Madhab::Shafi => "shafi",
    Madhab::Hanafi => "hanafi",
]);

snake_case_enum_str!(HighLatitudeRule, "high_latitude_rule", [
    HighLatitudeRule::MiddleOfTheNight => "middle_of_the_night",
    HighLatitudeRule::SeventhOfTheNight => "seventh_of_the_night",
    HighLatitudeRule::TwilightAngle => "twilight_angle",
]);
