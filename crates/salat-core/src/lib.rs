//! # Salat Core Library
//!
//! This library provides the core logic for tracking daily observance of the
//! five obligatory prayers. All operations are available through the `salat`
//! CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Times**: Turns a location and calculation settings into the day's
//!   canonical instants. The astronomy itself is delegated to an
//!   [`AstronomyService`] implementation
//! - **Adherence**: One record per date of which prayers were performed and
//!   whether on time
//! - **Streaks & Stats**: Derived on demand from the adherence history
//! - **Notifications**: Idempotent reminder scheduling and a host-owned pump
//!   that fires due reminders through a [`NotificationSink`]
//! - **Storage**: SQLite-backed key/value blobs and TOML configuration
//!
//! ## Key Components
//!
//! - [`PrayerTracker`]: Facade used by hosts
//! - [`TimeWindowCalculator`]: Daily instants
//! - [`StreakEngine`]: Three streak variants with best-streak watermarks
//! - [`NotificationPump`]: Recurring reminder delivery
//! - [`Database`]: Persistence

pub mod adherence;
pub mod error;
pub mod events;
pub mod location;
pub mod notifications;
pub mod prayer;
pub mod stats;
pub mod status;
pub mod storage;
pub mod streak;
pub mod times;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use adherence::{AdherenceRecords, AdherenceStore, DailyAdherenceRecord, PrayerLog};
pub use error::{
    CalculationError, ConfigError, CoreError, DatabaseError, NotificationError, ValidationError,
};
pub use events::Event;
pub use location::{Location, PlaceLabel, ReverseGeocoder};
pub use notifications::{
    NotificationPreference, NotificationPreferences, NotificationPump, NotificationScheduler,
    NotificationSink, Permission, PumpSettings, PumpStopper, ScheduleReport, ScheduledNotification,
    TimingOffset,
};
pub use prayer::{Prayer, TimeKey};
pub use stats::{PeriodStats, StatisticsAggregator, StatisticsSnapshot};
pub use status::{PrayerStatus, PrayerStatusProjector};
pub use storage::{Config, Database, KeyValueStore, ProfileStore};
pub use streak::{StreakEngine, StreakState, StreakStates, StreakUpdate, StreakVariant};
pub use times::{
    AstronomyService, CalculationMethod, CalculationSettings, DailyInstants, HighLatitudeRule,
    Madhab, PrayerAdjustments, TimeWindowCalculator, TimetableDay, TimetableService,
};
pub use tracker::{DayStatus, LogOutcome, PrayerTracker};
