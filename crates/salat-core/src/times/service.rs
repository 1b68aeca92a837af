use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::settings::{HighLatitudeRule, PrayerAdjustments};
use crate::error::CalculationError;
use crate::prayer::TimeKey;

/// Everything an astronomical prayer-time service needs for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct AstronomyRequest {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
    pub fajr_angle: f64,
    pub isha_angle: f64,
    pub isha_interval_min: Option<u32>,
    /// 1 for the standard shadow length, 2 for Hanafi.
    pub asr_shadow_factor: u8,
    /// Passed through exactly as the user configured it.
    pub high_latitude_rule: HighLatitudeRule,
    /// Method and user adjustments, already combined.
    pub adjustments: PrayerAdjustments,
}

/// The six instants an astronomical service produces for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInstants {
    pub fajr: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
}

impl CanonicalInstants {
    pub fn ordered(&self) -> [(TimeKey, DateTime<Utc>); 6] {
        [
            (TimeKey::Fajr, self.fajr),
            (TimeKey::Sunrise, self.sunrise),
            (TimeKey::Dhuhr, self.dhuhr),
            (TimeKey::Asr, self.asr),
            (TimeKey::Maghrib, self.maghrib),
            (TimeKey::Isha, self.isha),
        ]
    }
}

/// External astronomical computation.
///
/// Implementations own all spherical-astronomy math; callers only forward
/// parameters and consume the resulting instants.
pub trait AstronomyService {
    /// Identifier used in logs and errors (e.g. "timetable").
    fn name(&self) -> &str;

    fn compute(&self, request: &AstronomyRequest) -> Result<CanonicalInstants, CalculationError>;
}
