//! Consecutive-day streaks.
//!
//! Three variants are maintained side by side, each a backward scan from
//! today over the adherence history, capped at [`MAX_SCAN_DAYS`]:
//!
//! - `all_prayers`: all five prayers logged
//! - `fajr_only`: fajr logged
//! - `on_time_all`: all five prayers logged on time
//!
//! A scan stops at the first day with no record or a miss, so an incomplete
//! today truncates `all_prayers` and `on_time_all` until it is completed.
//! `best_streak` is a high-water mark that never decreases.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::adherence::{AdherenceRecords, AdherenceStore, DailyAdherenceRecord};
use crate::error::Result;
use crate::events::Event;
use crate::storage::{keys, read_json, update_json, KeyValueStore};

/// Upper bound on how many days any backward scan inspects.
pub const MAX_SCAN_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakVariant {
    AllPrayers,
    FajrOnly,
    OnTimeAll,
}

impl StreakVariant {
    pub const ALL: [StreakVariant; 3] = [
        StreakVariant::AllPrayers,
        StreakVariant::FajrOnly,
        StreakVariant::OnTimeAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakVariant::AllPrayers => "all_prayers",
            StreakVariant::FajrOnly => "fajr_only",
            StreakVariant::OnTimeAll => "on_time_all",
        }
    }

    /// Whether a day counts towards this variant.
    pub fn satisfied_by(&self, record: &DailyAdherenceRecord) -> bool {
        match self {
            StreakVariant::AllPrayers => record.all_logged(),
            StreakVariant::FajrOnly => record.fajr.logged,
            StreakVariant::OnTimeAll => record.all_on_time(),
        }
    }
}

impl fmt::Display for StreakVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub best_streak: u32,
    pub last_updated: DateTime<Utc>,
    pub is_active: bool,
}

pub type StreakStates = BTreeMap<StreakVariant, StreakState>;

/// Count consecutive days ending at `today` for which `day_ok` holds.
pub fn backward_scan<F>(records: &AdherenceRecords, today: NaiveDate, day_ok: F) -> u32
where
    F: Fn(&DailyAdherenceRecord) -> bool,
{
    let mut count = 0;
    for offset in 0..MAX_SCAN_DAYS {
        let Some(date) = today.checked_sub_days(Days::new(offset as u64)) else {
            break;
        };
        match records.get(&date) {
            Some(record) if day_ok(record) => count += 1,
            _ => break,
        }
    }
    count
}

/// Current streak for every variant, without touching stored watermarks.
pub fn current_streaks(records: &AdherenceRecords, today: NaiveDate) -> BTreeMap<StreakVariant, u32> {
    StreakVariant::ALL
        .into_iter()
        .map(|variant| (variant, backward_scan(records, today, |r| variant.satisfied_by(r))))
        .collect()
}

/// Result of one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub states: StreakStates,
    /// Variants whose best streak rose in this pass.
    pub new_records: Vec<StreakVariant>,
}

impl StreakUpdate {
    pub fn events(&self, at: DateTime<Utc>) -> Vec<Event> {
        self.new_records
            .iter()
            .map(|variant| Event::StreakRecord {
                variant: *variant,
                best_streak: self.states[variant].best_streak,
                at,
            })
            .collect()
    }
}

pub struct StreakEngine<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> StreakEngine<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Rescan all variants and persist them with their watermarks.
    pub fn recompute(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<StreakUpdate> {
        let records = AdherenceStore::new(self.store).records()?;
        let current = current_streaks(&records, today);

        let update = update_json(self.store, keys::STREAK_STATES, |states: &mut StreakStates| {
            let mut new_records = Vec::new();
            for (variant, streak) in &current {
                let previous_best = states.get(variant).map(|s| s.best_streak).unwrap_or(0);
                let best_streak = previous_best.max(*streak);
                if best_streak > previous_best {
                    new_records.push(*variant);
                }
                states.insert(
                    *variant,
                    StreakState {
                        current_streak: *streak,
                        best_streak,
                        last_updated: now,
                        is_active: *streak > 0,
                    },
                );
            }
            StreakUpdate {
                states: states.clone(),
                new_records,
            }
        })?;

        for variant in &update.new_records {
            tracing::info!(
                %variant,
                best = update.states[variant].best_streak,
                "new best streak"
            );
        }
        Ok(update)
    }

    /// Stored states as of the last recomputation.
    pub fn states(&self) -> Result<StreakStates> {
        read_json(self.store, keys::STREAK_STATES)
    }
}
