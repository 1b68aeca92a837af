//! Host-facing facade.
//!
//! [`PrayerTracker`] wires the stored profile, the astronomy service and the
//! adherence history together. Every mutation re-reads the persisted state
//! immediately before writing it back.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::adherence::{AdherenceStore, DailyAdherenceRecord};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::location::Location;
use crate::notifications::{NotificationScheduler, ScheduleReport};
use crate::prayer::{Prayer, TimeKey};
use crate::stats::{StatisticsAggregator, StatisticsSnapshot};
use crate::status::{PrayerStatus, PrayerStatusProjector};
use crate::storage::{KeyValueStore, ProfileStore};
use crate::streak::{StreakEngine, StreakStates};
use crate::times::{AstronomyService, CalculationSettings, DailyInstants, TimeWindowCalculator};

/// Status of all five prayers on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub location: String,
    pub sunrise: String,
    pub prayers: Vec<PrayerStatus>,
    pub next_prayer: Option<Prayer>,
}

/// What a successful log produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOutcome {
    pub record: DailyAdherenceRecord,
    pub streaks: StreakStates,
    pub events: Vec<Event>,
}

pub struct PrayerTracker<'a> {
    store: &'a dyn KeyValueStore,
    astronomy: &'a dyn AstronomyService,
    projector: PrayerStatusProjector,
}

impl<'a> PrayerTracker<'a> {
    pub fn new(store: &'a dyn KeyValueStore, astronomy: &'a dyn AstronomyService) -> Self {
        Self {
            store,
            astronomy,
            projector: PrayerStatusProjector::default(),
        }
    }

    pub fn with_current_window(mut self, window: Duration) -> Self {
        self.projector = PrayerStatusProjector::new(window);
        self
    }

    pub fn profile(&self) -> ProfileStore<'a> {
        ProfileStore::new(self.store)
    }

    /// The saved location, required for anything time-based.
    pub fn location(&self) -> Result<Location> {
        self.profile()
            .location()?
            .ok_or_else(|| ValidationError::Missing("location".into()).into())
    }

    /// Calendar date at `now` in the saved location's zone, UTC without one.
    pub fn local_date(&self, now: DateTime<Utc>) -> Result<NaiveDate> {
        match self.profile().location()? {
            Some(location) => Ok(now.with_timezone(&location.tz()?).date_naive()),
            None => Ok(now.date_naive()),
        }
    }

    pub fn instants(&self, date: NaiveDate) -> Result<DailyInstants> {
        let location = self.location()?;
        let settings = self.profile().settings()?;
        TimeWindowCalculator::new(self.astronomy).compute(date, &location, &settings)
    }

    /// Five prayer statuses for `date` at an explicit location and settings.
    pub fn compute_status(
        &self,
        location: &Location,
        settings: &CalculationSettings,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DayStatus> {
        let instants = TimeWindowCalculator::new(self.astronomy).compute(date, location, settings)?;
        let record = AdherenceStore::new(self.store).record(date)?;
        Ok(DayStatus {
            date,
            location: location.display_name(),
            sunrise: instants
                .local(TimeKey::Sunrise)
                .format("%H:%M")
                .to_string(),
            prayers: self.projector.project(&instants, now, record.as_ref()),
            next_prayer: PrayerStatusProjector::next_prayer(&instants, now).map(|(p, _)| p),
        })
    }

    /// Status for `date` (local today when `None`) from the stored profile.
    pub fn status(&self, date: Option<NaiveDate>, now: DateTime<Utc>) -> Result<DayStatus> {
        let location = self.location()?;
        let settings = self.profile().settings()?;
        let date = match date {
            Some(date) => date,
            None => now.with_timezone(&location.tz()?).date_naive(),
        };
        self.compute_status(&location, &settings, date, now)
    }

    /// Log a prayer and rescan all streaks.
    ///
    /// # Errors
    /// Returns a validation error for a date after the local today.
    pub fn log_prayer(
        &self,
        prayer: Prayer,
        on_time: bool,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<LogOutcome> {
        let today = self.local_date(now)?;
        let date = date.unwrap_or(today);
        if date > today {
            return Err(ValidationError::invalid(
                "date",
                format!("{date} is in the future (today is {today})"),
            )
            .into());
        }

        let record = AdherenceStore::new(self.store).log_prayer(prayer, on_time, date, now)?;
        let update = StreakEngine::new(self.store).recompute(today, now)?;

        let mut events = vec![Event::PrayerLogged {
            date,
            prayer,
            on_time,
            at: now,
        }];
        events.extend(update.events(now));
        Ok(LogOutcome {
            record,
            streaks: update.states,
            events,
        })
    }

    /// Fresh streaks and rolling statistics as of `now`.
    pub fn statistics(&self, now: DateTime<Utc>) -> Result<StatisticsSnapshot> {
        let today = self.local_date(now)?;
        let streaks = StreakEngine::new(self.store).recompute(today, now)?.states;
        let records = AdherenceStore::new(self.store).records()?;
        Ok(StatisticsAggregator::snapshot(&records, today, streaks))
    }

    pub fn streaks(&self, now: DateTime<Utc>) -> Result<StreakStates> {
        let today = self.local_date(now)?;
        Ok(StreakEngine::new(self.store).recompute(today, now)?.states)
    }

    pub fn schedule_today(&self, now: DateTime<Utc>) -> Result<ScheduleReport> {
        let today = self.local_date(now)?;
        self.schedule_for(today, now)
    }

    pub fn schedule_for(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<ScheduleReport> {
        let instants = self.instants(date)?;
        let preferences = self.profile().preferences()?;
        NotificationScheduler::new(self.store).schedule(&instants, &preferences, now)
    }

    /// Adherence records, oldest first.
    pub fn history(&self) -> Result<Vec<DailyAdherenceRecord>> {
        Ok(AdherenceStore::new(self.store).records()?.into_values().collect())
    }
}
