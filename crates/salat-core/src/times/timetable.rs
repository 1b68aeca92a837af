//! Timetable-backed astronomy service.
//!
//! Mosques and Islamic centres publish pre-validated timetables. This service
//! serves the six canonical instants from such a table, stored as TOML:
//!
//! ```toml
//! [default]
//! fajr = "05:12"
//! sunrise = "06:41"
//! dhuhr = "12:30"
//! asr = "15:47"
//! maghrib = "18:19"
//! isha = "19:42"
//!
//! [dates."2026-10-18"]
//! fajr = "05:14"
//! # ...
//! ```
//!
//! Times are local wall-clock times in the requested timezone. A time not
//! later than the one before it in the row falls on the next day. The table
//! already embeds its method and high-latitude policy, so angles in the
//! request are not recomputed; minute adjustments are applied.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::service::{AstronomyRequest, AstronomyService, CanonicalInstants};
use crate::error::{CalculationError, ConfigError};
use crate::prayer::TimeKey;

/// One row of a timetable, as "HH:MM" strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDay {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TimetableFile {
    #[serde(default)]
    default: Option<TimetableDay>,
    #[serde(default)]
    dates: BTreeMap<String, TimetableDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParsedDay([NaiveTime; 6]);

#[derive(Debug, Clone, Default)]
pub struct TimetableService {
    default: Option<ParsedDay>,
    dates: BTreeMap<NaiveDate, ParsedDay>,
}

impl TimetableDay {
    fn parse(&self, context: &str) -> Result<ParsedDay, ConfigError> {
        let fields = [
            ("fajr", &self.fajr),
            ("sunrise", &self.sunrise),
            ("dhuhr", &self.dhuhr),
            ("asr", &self.asr),
            ("maghrib", &self.maghrib),
            ("isha", &self.isha),
        ];
        let mut times = [NaiveTime::MIN; 6];
        for (slot, (name, raw)) in times.iter_mut().zip(fields) {
            *slot = NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
                ConfigError::InvalidValue {
                    key: format!("{context}.{name}"),
                    message: format!("'{raw}' is not HH:MM ({e})"),
                }
            })?;
        }
        Ok(ParsedDay(times))
    }
}

impl TimetableService {
    /// A table that serves the same times every day.
    pub fn uniform(day: TimetableDay) -> Result<Self, ConfigError> {
        Ok(Self {
            default: Some(day.parse("default")?),
            dates: BTreeMap::new(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TimetableFile =
            toml::from_str(content).map_err(|e| ConfigError::InvalidValue {
                key: "timetable".into(),
                message: e.to_string(),
            })?;

        let default = file.default.as_ref().map(|d| d.parse("default")).transpose()?;
        let mut dates = BTreeMap::new();
        for (key, day) in &file.dates {
            let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|e| {
                ConfigError::InvalidValue {
                    key: format!("dates.{key}"),
                    message: format!("not a YYYY-MM-DD date ({e})"),
                }
            })?;
            dates.insert(date, day.parse(&format!("dates.{key}"))?);
        }
        Ok(Self { default, dates })
    }

    /// Load a timetable file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or any entry is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn insert(&mut self, date: NaiveDate, day: TimetableDay) -> Result<(), ConfigError> {
        let parsed = day.parse(&format!("dates.{date}"))?;
        self.dates.insert(date, parsed);
        Ok(())
    }

    /// Number of rows, the default row included.
    pub fn len(&self) -> usize {
        self.dates.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.default.is_none()
    }
}

impl AstronomyService for TimetableService {
    fn name(&self) -> &str {
        "timetable"
    }

    fn compute(&self, request: &AstronomyRequest) -> Result<CanonicalInstants, CalculationError> {
        let day = self
            .dates
            .get(&request.date)
            .or(self.default.as_ref())
            .ok_or_else(|| CalculationError::ServiceFailed {
                service: self.name().to_string(),
                date: request.date,
                message: "no timetable entry for this date".into(),
            })?;

        let keys = [
            TimeKey::Fajr,
            TimeKey::Sunrise,
            TimeKey::Dhuhr,
            TimeKey::Asr,
            TimeKey::Maghrib,
            TimeKey::Isha,
        ];
        let mut out = [DateTime::<Utc>::MIN_UTC; 6];
        let mut date = request.date;
        let mut previous: Option<NaiveTime> = None;
        for ((slot, key), time) in out.iter_mut().zip(keys).zip(day.0) {
            // A row is in canonical order; a time that does not advance has
            // crossed midnight (isha after 00:00 at high latitudes).
            if previous.is_some_and(|p| time <= p) {
                date = date.succ_opt().ok_or_else(|| CalculationError::ServiceFailed {
                    service: self.name().to_string(),
                    date: request.date,
                    message: "date out of range".into(),
                })?;
            }
            previous = Some(time);
            let local = request
                .timezone
                .from_local_datetime(&date.and_time(time))
                .earliest()
                .ok_or_else(|| CalculationError::UnresolvableLocalTime {
                    date,
                    time,
                    timezone: request.timezone.name().to_string(),
                })?;
            let minutes = request.adjustments.minutes(key);
            *slot = local.with_timezone(&Utc) + Duration::minutes(minutes as i64);
        }

        Ok(CanonicalInstants {
            fajr: out[0],
            sunrise: out[1],
            dhuhr: out[2],
            asr: out[3],
            maghrib: out[4],
            isha: out[5],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use crate::times::calculator::TimeWindowCalculator;
    use crate::times::settings::CalculationSettings;
    use chrono::Timelike;
    use std::io::Write;

    const TABLE: &str = r#"
[default]
fajr = "05:00"
sunrise = "06:30"
dhuhr = "12:30"
asr = "15:45"
maghrib = "18:20"
isha = "19:40"

[dates."2024-03-10"]
fajr = "04:50"
sunrise = "06:20"
dhuhr = "12:25"
asr = "15:40"
maghrib = "18:25"
isha = "19:45"
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serves_dated_entry_before_default() {
        let service = TimetableService::from_toml_str(TABLE).unwrap();
        let location = Location::new(21.42, 39.83, "Asia/Riyadh").unwrap();
        let settings = CalculationSettings {
            method: crate::times::CalculationMethod::Kuwait,
            ..Default::default()
        };
        let calc = TimeWindowCalculator::new(&service);

        let special = calc.compute(date(2024, 3, 10), &location, &settings).unwrap();
        let fajr = special.local(TimeKey::Fajr);
        assert_eq!((fajr.hour(), fajr.minute()), (4, 50));

        let ordinary = calc.compute(date(2024, 3, 11), &location, &settings).unwrap();
        let dhuhr = ordinary.local(TimeKey::Dhuhr);
        assert_eq!((dhuhr.hour(), dhuhr.minute()), (12, 30));
    }

    #[test]
    fn applies_adjustments_in_minutes() {
        let service = TimetableService::from_toml_str(TABLE).unwrap();
        let location = Location::new(21.42, 39.83, "Asia/Riyadh").unwrap();
        let mut settings = CalculationSettings {
            method: crate::times::CalculationMethod::Kuwait,
            ..Default::default()
        };
        settings.adjustments.set(TimeKey::Isha, 10).unwrap();
        let calc = TimeWindowCalculator::new(&service);
        let day = calc.compute(date(2024, 3, 11), &location, &settings).unwrap();
        let isha = day.local(TimeKey::Isha);
        assert_eq!((isha.hour(), isha.minute()), (19, 50));
    }

    #[test]
    fn missing_day_without_default_is_an_error() {
        let mut service = TimetableService::default();
        service
            .insert(
                date(2024, 3, 10),
                TimetableDay {
                    fajr: "05:00".into(),
                    sunrise: "06:30".into(),
                    dhuhr: "12:30".into(),
                    asr: "15:45".into(),
                    maghrib: "18:20".into(),
                    isha: "19:40".into(),
                },
            )
            .unwrap();
        let location = Location::new(51.5, -0.1, "Europe/London").unwrap();
        let calc = TimeWindowCalculator::new(&service);
        // The next day is needed for the night markers and is absent.
        assert!(calc
            .compute(date(2024, 3, 10), &location, &CalculationSettings::default())
            .is_err());
    }

    #[test]
    fn rejects_malformed_times() {
        let bad = TABLE.replace("\"15:45\"", "\"quarter to four\"");
        let err = TimetableService::from_toml_str(&bad).unwrap_err();
        assert!(err.to_string().contains("default.asr"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("timetable.toml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(TABLE.as_bytes())
            .unwrap();
        let service = TimetableService::load(&path).unwrap();
        assert_eq!(service.len(), 2);
        assert!(!service.is_empty());
    }

    #[test]
    fn default_row_alone_counts_as_a_row() {
        let only_default = TABLE.split("[dates.").next().unwrap();
        let service = TimetableService::from_toml_str(only_default).unwrap();
        assert_eq!(service.len(), 1);
        assert!(!service.is_empty());

        let empty = TimetableService::default();
        assert_eq!(empty.len(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn isha_after_midnight_moves_to_the_next_day() {
        let summer = TimetableDay {
            fajr: "01:30".into(),
            sunrise: "03:55".into(),
            dhuhr: "13:20".into(),
            asr: "17:50".into(),
            maghrib: "22:45".into(),
            isha: "00:30".into(),
        };
        let service = TimetableService::uniform(summer).unwrap();
        let location = Location::new(59.91, 10.75, "Europe/Oslo").unwrap();
        let settings = CalculationSettings {
            method: crate::times::CalculationMethod::Kuwait,
            ..Default::default()
        };
        let day = TimeWindowCalculator::new(&service)
            .compute(date(2024, 6, 21), &location, &settings)
            .unwrap();

        assert!(day.isha > day.maghrib);
        let isha = day.local(TimeKey::Isha);
        assert_eq!(isha.date_naive(), date(2024, 6, 22));
        assert_eq!((isha.hour(), isha.minute()), (0, 30));
        let maghrib = day.local(TimeKey::Maghrib);
        assert_eq!(maghrib.date_naive(), date(2024, 6, 21));
    }
}
