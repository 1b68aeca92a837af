//! Deterministic, idempotent reminder scheduling.
//!
//! Each reminder id is `"{date}-{prayer}-{timing}"`, so scheduling the same
//! day twice with the same preferences produces no new entries. Fired
//! entries are never re-armed by a later scheduling pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::preferences::{NotificationPreferences, TimingOffset};
use crate::error::Result;
use crate::events::Event;
use crate::prayer::Prayer;
use crate::storage::{keys, read_json, update_json, KeyValueStore};
use crate::times::DailyInstants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: String,
    pub date: NaiveDate,
    pub prayer: Prayer,
    pub scheduled_instant: DateTime<Utc>,
    pub actual_prayer_instant: DateTime<Utc>,
    pub timing_offset: TimingOffset,
    pub title: String,
    pub message: String,
    pub is_active: bool,
    pub has_fired: bool,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub fired_at: Option<DateTime<Utc>>,
}

impl ScheduledNotification {
    pub fn make_id(date: NaiveDate, prayer: Prayer, timing: TimingOffset) -> String {
        format!("{}-{}-{}", date.format("%Y-%m-%d"), prayer, timing)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.has_fired && self.scheduled_instant <= now
    }
}

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub date: Option<NaiveDate>,
    pub created: Vec<String>,
    pub skipped_existing: usize,
}

impl ScheduleReport {
    pub fn event(&self, at: DateTime<Utc>) -> Option<Event> {
        self.date.map(|date| Event::RemindersScheduled {
            date,
            created: self.created.clone(),
            skipped_existing: self.skipped_existing,
            at,
        })
    }
}

pub struct NotificationScheduler<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> NotificationScheduler<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Reminders the preferences call for on `instants.date`, before any
    /// deduplication against the store.
    pub fn plan(
        instants: &DailyInstants,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> Vec<ScheduledNotification> {
        preferences
            .enabled()
            .map(|pref| {
                let actual = instants.prayer(pref.prayer);
                ScheduledNotification {
                    id: ScheduledNotification::make_id(instants.date, pref.prayer, pref.timing),
                    date: instants.date,
                    prayer: pref.prayer,
                    scheduled_instant: actual + pref.timing.duration(),
                    actual_prayer_instant: actual,
                    timing_offset: pref.timing,
                    title: format!("{} Prayer", pref.prayer.display_name()),
                    message: pref.timing.message(pref.prayer),
                    is_active: true,
                    has_fired: false,
                    date_created: now,
                    fired_at: None,
                }
            })
            .collect()
    }

    /// Merge the day's reminders into the persisted list in one write.
    ///
    /// Existing ids are skipped whether or not they have fired. A reminder
    /// whose instant is already behind `now` is still created and is due on
    /// the pump's next tick.
    pub fn schedule(
        &self,
        instants: &DailyInstants,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> Result<ScheduleReport> {
        let planned = Self::plan(instants, preferences, now);
        let report = update_json(
            self.store,
            keys::SCHEDULED_NOTIFICATIONS,
            |entries: &mut Vec<ScheduledNotification>| {
                let existing: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();
                let mut report = ScheduleReport {
                    date: Some(instants.date),
                    ..Default::default()
                };
                for entry in planned {
                    if existing.contains(&entry.id) {
                        report.skipped_existing += 1;
                    } else {
                        report.created.push(entry.id.clone());
                        entries.push(entry);
                    }
                }
                report
            },
        )?;

        tracing::info!(
            date = %instants.date,
            created = report.created.len(),
            skipped_existing = report.skipped_existing,
            "reminders scheduled"
        );
        Ok(report)
    }

    pub fn entries(&self) -> Result<Vec<ScheduledNotification>> {
        let mut entries: Vec<ScheduledNotification> =
            read_json(self.store, keys::SCHEDULED_NOTIFICATIONS)?;
        entries.sort_by(|a, b| a.scheduled_instant.cmp(&b.scheduled_instant));
        Ok(entries)
    }

    /// Active reminders that have not fired yet.
    pub fn pending(&self) -> Result<Vec<ScheduledNotification>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.is_active && !e.has_fired)
            .collect())
    }

    /// Soft-delete one reminder. Returns false if the id is unknown or the
    /// reminder was already inactive.
    pub fn cancel(&self, id: &str) -> Result<bool> {
        let cancelled = update_json(
            self.store,
            keys::SCHEDULED_NOTIFICATIONS,
            |entries: &mut Vec<ScheduledNotification>| {
                match entries.iter_mut().find(|e| e.id == id && e.is_active) {
                    Some(entry) => {
                        entry.is_active = false;
                        true
                    }
                    None => false,
                }
            },
        )?;
        if cancelled {
            tracing::info!(id, "reminder cancelled");
        }
        Ok(cancelled)
    }

    /// Soft-delete every active reminder of `date`.
    pub fn cancel_for_date(&self, date: NaiveDate) -> Result<Vec<String>> {
        let ids = update_json(
            self.store,
            keys::SCHEDULED_NOTIFICATIONS,
            |entries: &mut Vec<ScheduledNotification>| {
                entries
                    .iter_mut()
                    .filter(|e| e.date == date && e.is_active)
                    .map(|e| {
                        e.is_active = false;
                        e.id.clone()
                    })
                    .collect::<Vec<_>>()
            },
        )?;
        tracing::info!(%date, count = ids.len(), "reminders cancelled");
        Ok(ids)
    }
}
