//! Canonical prayer instants.
//!
//! [`TimeWindowCalculator`] turns a date, a [`crate::Location`] and
//! [`CalculationSettings`] into [`DailyInstants`] by delegating the astronomy
//! to an [`AstronomyService`].

mod calculator;
mod service;
mod settings;
mod timetable;

pub use calculator::{DailyInstants, TimeWindowCalculator};
pub use service::{AstronomyRequest, AstronomyService, CanonicalInstants};
pub use settings::{
    CalculationMethod, CalculationSettings, HighLatitudeRule, Madhab, MethodParameters,
    PrayerAdjustments, MAX_ADJUSTMENT_MIN,
};
pub use timetable::{TimetableDay, TimetableService};
