//! Per-day prayer observance records.
//!
//! One [`DailyAdherenceRecord`] exists per calendar date. It is created the
//! first time any prayer of that date is logged; untouched prayers keep the
//! `{logged: false, on_time: false}` default. Records are never pruned.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::prayer::Prayer;
use crate::storage::{keys, read_json, update_json, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrayerLog {
    pub logged: bool,
    pub on_time: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAdherenceRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub fajr: PrayerLog,
    #[serde(default)]
    pub dhuhr: PrayerLog,
    #[serde(default)]
    pub asr: PrayerLog,
    #[serde(default)]
    pub maghrib: PrayerLog,
    #[serde(default)]
    pub isha: PrayerLog,
}

/// Full history, keyed by date.
pub type AdherenceRecords = BTreeMap<NaiveDate, DailyAdherenceRecord>;

impl DailyAdherenceRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fajr: PrayerLog::default(),
            dhuhr: PrayerLog::default(),
            asr: PrayerLog::default(),
            maghrib: PrayerLog::default(),
            isha: PrayerLog::default(),
        }
    }

    pub fn get(&self, prayer: Prayer) -> &PrayerLog {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }

    fn get_mut(&mut self, prayer: Prayer) -> &mut PrayerLog {
        match prayer {
            Prayer::Fajr => &mut self.fajr,
            Prayer::Dhuhr => &mut self.dhuhr,
            Prayer::Asr => &mut self.asr,
            Prayer::Maghrib => &mut self.maghrib,
            Prayer::Isha => &mut self.isha,
        }
    }

    pub fn logs(&self) -> impl Iterator<Item = (Prayer, &PrayerLog)> + '_ {
        Prayer::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    pub fn all_logged(&self) -> bool {
        self.logs().all(|(_, log)| log.logged)
    }

    pub fn all_on_time(&self) -> bool {
        self.logs().all(|(_, log)| log.on_time)
    }

    pub fn logged_count(&self) -> u32 {
        self.logs().filter(|(_, log)| log.logged).count() as u32
    }

    pub fn on_time_count(&self) -> u32 {
        self.logs().filter(|(_, log)| log.on_time).count() as u32
    }

    pub fn missed(&self) -> Vec<Prayer> {
        self.logs()
            .filter(|(_, log)| !log.logged)
            .map(|(p, _)| p)
            .collect()
    }
}

pub struct AdherenceStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> AdherenceStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Mark `prayer` as performed on `date`, creating the day's record on
    /// first touch. Logging the same prayer again overwrites its on-time flag.
    pub fn log_prayer(
        &self,
        prayer: Prayer,
        on_time: bool,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<DailyAdherenceRecord> {
        let record = update_json(self.store, keys::ADHERENCE_RECORDS, |records: &mut AdherenceRecords| {
            let record = records
                .entry(date)
                .or_insert_with(|| DailyAdherenceRecord::new(date));
            *record.get_mut(prayer) = PrayerLog {
                logged: true,
                on_time,
                timestamp: Some(at),
            };
            record.clone()
        })?;
        tracing::info!(%date, %prayer, on_time, "prayer logged");
        Ok(record)
    }

    /// Entire unbounded history.
    pub fn records(&self) -> Result<AdherenceRecords> {
        read_json(self.store, keys::ADHERENCE_RECORDS)
    }

    pub fn record(&self, date: NaiveDate) -> Result<Option<DailyAdherenceRecord>> {
        Ok(self.records()?.remove(&date))
    }
}
