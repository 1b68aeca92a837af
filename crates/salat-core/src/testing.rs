//! Shared fixtures for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::location::Location;
use crate::times::{
    CalculationMethod, CalculationSettings, DailyInstants, TimeWindowCalculator, TimetableDay,
    TimetableService,
};

pub(crate) fn riyadh() -> Location {
    Location::new(24.7136, 46.6753, "Asia/Riyadh").unwrap()
}

/// Same local times every day: 05:00, 06:30, 12:30, 15:45, 18:20, 19:40.
pub(crate) fn timetable() -> TimetableService {
    TimetableService::uniform(TimetableDay {
        fajr: "05:00".into(),
        sunrise: "06:30".into(),
        dhuhr: "12:30".into(),
        asr: "15:45".into(),
        maghrib: "18:20".into(),
        isha: "19:40".into(),
    })
    .unwrap()
}

/// A method without built-in minute adjustments, so the timetable is served as is.
pub(crate) fn plain_settings() -> CalculationSettings {
    CalculationSettings {
        method: CalculationMethod::Kuwait,
        ..Default::default()
    }
}

pub(crate) fn fixed_day(y: i32, m: u32, d: u32) -> DailyInstants {
    let service = timetable();
    TimeWindowCalculator::new(&service)
        .compute(NaiveDate::from_ymd_opt(y, m, d).unwrap(), &riyadh(), &plain_settings())
        .unwrap()
}

/// `h:m` local time on the instants' date.
pub(crate) fn local(day: &DailyInstants, h: u32, m: u32) -> DateTime<Utc> {
    day.timezone
        .from_local_datetime(&day.date.and_hms_opt(h, m, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc)
}
