//! Daily prayer-time window calculation.
//!
//! The calculator does no astronomy. It validates the location, translates
//! [`CalculationSettings`] into an [`AstronomyRequest`], asks the service for
//! the target day and the following one, and derives the two night markers
//! from the maghrib to next-fajr interval.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::service::{AstronomyRequest, AstronomyService, CanonicalInstants};
use super::settings::CalculationSettings;
use crate::error::{CalculationError, Result};
use crate::location::Location;
use crate::prayer::{Prayer, TimeKey};

/// All eight named instants of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInstants {
    pub date: NaiveDate,
    pub timezone: Tz,
    pub fajr: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
    pub middle_of_night: DateTime<Utc>,
    pub last_third_of_night: DateTime<Utc>,
}

impl DailyInstants {
    pub fn get(&self, key: TimeKey) -> DateTime<Utc> {
        match key {
            TimeKey::Fajr => self.fajr,
            TimeKey::Sunrise => self.sunrise,
            TimeKey::Dhuhr => self.dhuhr,
            TimeKey::Asr => self.asr,
            TimeKey::Maghrib => self.maghrib,
            TimeKey::Isha => self.isha,
            TimeKey::MiddleOfNight => self.middle_of_night,
            TimeKey::LastThirdOfNight => self.last_third_of_night,
        }
    }

    pub fn prayer(&self, prayer: Prayer) -> DateTime<Utc> {
        self.get(prayer.time_key())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeKey, DateTime<Utc>)> + '_ {
        TimeKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Instant rendered in the location's zone.
    pub fn local(&self, key: TimeKey) -> DateTime<Tz> {
        self.get(key).with_timezone(&self.timezone)
    }
}

pub struct TimeWindowCalculator<'a> {
    service: &'a dyn AstronomyService,
}

impl<'a> TimeWindowCalculator<'a> {
    pub fn new(service: &'a dyn AstronomyService) -> Self {
        Self { service }
    }

    /// Build the request the service will see for `date`.
    pub fn request(
        date: NaiveDate,
        location: &Location,
        settings: &CalculationSettings,
    ) -> Result<AstronomyRequest> {
        location.validate()?;
        settings.adjustments.validate()?;
        let params = settings.method.parameters();
        Ok(AstronomyRequest {
            date,
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.tz()?,
            fajr_angle: params.fajr_angle,
            isha_angle: params.isha_angle,
            isha_interval_min: params.isha_interval_min,
            asr_shadow_factor: settings.madhab.shadow_factor(),
            high_latitude_rule: settings.high_latitude_rule,
            adjustments: settings.total_adjustments(),
        })
    }

    /// Compute the day's eight instants.
    ///
    /// # Errors
    /// Returns a validation error for a bad location or adjustment, and a
    /// [`CalculationError`] when the service fails or returns instants out of
    /// canonical order.
    pub fn compute(
        &self,
        date: NaiveDate,
        location: &Location,
        settings: &CalculationSettings,
    ) -> Result<DailyInstants> {
        let request = Self::request(date, location, settings)?;
        let today = self.fetch(&request)?;

        let next_date = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CalculationError::ServiceFailed {
                service: self.service.name().to_string(),
                date,
                message: "date out of range".into(),
            })?;
        let next_request = AstronomyRequest {
            date: next_date,
            ..request.clone()
        };
        let tomorrow = self.fetch(&next_request)?;

        if tomorrow.fajr <= today.maghrib {
            return Err(CalculationError::UnorderedOutput {
                date,
                detail: format!(
                    "next fajr {} is not after maghrib {}",
                    tomorrow.fajr, today.maghrib
                ),
            }
            .into());
        }

        let night = tomorrow.fajr - today.maghrib;
        let middle_of_night = today.maghrib + night / 2;
        let last_third_of_night = today.maghrib + night * 2 / 3;

        tracing::debug!(
            %date,
            service = self.service.name(),
            method = %settings.method,
            "computed prayer times"
        );

        Ok(DailyInstants {
            date,
            timezone: request.timezone,
            fajr: today.fajr,
            sunrise: today.sunrise,
            dhuhr: today.dhuhr,
            asr: today.asr,
            maghrib: today.maghrib,
            isha: today.isha,
            middle_of_night,
            last_third_of_night,
        })
    }

    fn fetch(&self, request: &AstronomyRequest) -> Result<CanonicalInstants, CalculationError> {
        let instants = self.service.compute(request)?;
        let ordered = instants.ordered();
        for pair in ordered.windows(2) {
            let (earlier_key, earlier) = pair[0];
            let (later_key, later) = pair[1];
            if later <= earlier {
                return Err(CalculationError::UnorderedOutput {
                    date: request.date,
                    detail: format!("{later_key} ({later}) is not after {earlier_key} ({earlier})"),
                });
            }
        }
        Ok(instants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::times::settings::{HighLatitudeRule, Madhab};
    use chrono::TimeZone;
    use std::cell::RefCell;

    /// Returns the same UTC wall times every day and remembers requests.
    struct RecordingService {
        seen: RefCell<Vec<AstronomyRequest>>,
        fail_on: Option<NaiveDate>,
        swap_asr: bool,
    }

    impl RecordingService {
        fn new() -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
                fail_on: None,
                swap_asr: false,
            }
        }
    }

    impl AstronomyService for RecordingService {
        fn name(&self) -> &str {
            "recording"
        }

        fn compute(&self, request: &AstronomyRequest) -> Result<CanonicalInstants, CalculationError> {
            self.seen.borrow_mut().push(request.clone());
            if self.fail_on == Some(request.date) {
                return Err(CalculationError::ServiceFailed {
                    service: "recording".into(),
                    date: request.date,
                    message: "twilight never reached".into(),
                });
            }
            let d = request.date;
            let at = |h, m| {
                Utc.from_utc_datetime(&d.and_hms_opt(h, m, 0).unwrap())
            };
            let (asr, maghrib) = if self.swap_asr {
                (at(18, 30), at(15, 0))
            } else {
                (at(15, 0), at(18, 30))
            };
            Ok(CanonicalInstants {
                fajr: at(5, 0),
                sunrise: at(6, 30),
                dhuhr: at(12, 30),
                asr,
                maghrib,
                isha: at(20, 0),
            })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn london() -> Location {
        Location::new(51.5, -0.12, "Europe/London").unwrap()
    }

    #[test]
    fn derives_night_markers_from_maghrib_to_next_fajr() {
        let service = RecordingService::new();
        let calc = TimeWindowCalculator::new(&service);
        let day = calc
            .compute(date(2024, 3, 1), &london(), &CalculationSettings::default())
            .unwrap();

        // maghrib 18:30 -> next fajr 05:00 is 630 minutes.
        let maghrib = day.maghrib;
        assert_eq!(day.middle_of_night - maghrib, chrono::Duration::minutes(315));
        assert_eq!(day.last_third_of_night - maghrib, chrono::Duration::minutes(420));
        assert_eq!(day.iter().count(), 8);
    }

    #[test]
    fn forwards_high_latitude_rule_and_madhab_verbatim() {
        let service = RecordingService::new();
        let calc = TimeWindowCalculator::new(&service);
        let settings = CalculationSettings {
            madhab: Madhab::Hanafi,
            high_latitude_rule: HighLatitudeRule::SeventhOfTheNight,
            ..Default::default()
        };
        calc.compute(date(2024, 6, 21), &london(), &settings).unwrap();

        let seen = service.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].date, date(2024, 6, 21));
        assert_eq!(seen[1].date, date(2024, 6, 22));
        for request in seen.iter() {
            assert_eq!(request.high_latitude_rule, HighLatitudeRule::SeventhOfTheNight);
            assert_eq!(request.asr_shadow_factor, 2);
            assert_eq!(request.fajr_angle, 18.0);
            assert_eq!(request.adjustments.dhuhr, 1);
        }
    }

    #[test]
    fn service_failure_is_not_papered_over() {
        let mut service = RecordingService::new();
        service.fail_on = Some(date(2024, 3, 2));
        let calc = TimeWindowCalculator::new(&service);
        let err = calc
            .compute(date(2024, 3, 1), &london(), &CalculationSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Calculation(CalculationError::ServiceFailed { .. })
        ));
    }

    #[test]
    fn unordered_output_is_rejected() {
        let mut service = RecordingService::new();
        service.swap_asr = true;
        let calc = TimeWindowCalculator::new(&service);
        let err = calc
            .compute(date(2024, 3, 1), &london(), &CalculationSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Calculation(CalculationError::UnorderedOutput { .. })
        ));
    }

    #[test]
    fn invalid_location_never_reaches_service() {
        let service = RecordingService::new();
        let calc = TimeWindowCalculator::new(&service);
        let bad = Location {
            latitude: 100.0,
            longitude: 0.0,
            timezone: "UTC".into(),
            city: None,
            country: None,
        };
        let err = calc
            .compute(date(2024, 3, 1), &bad, &CalculationSettings::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(service.seen.borrow().is_empty());
    }
}
