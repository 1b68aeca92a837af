//! Rolling adherence statistics
//!
//! Everything here is derived from the adherence history on demand and holds
//! no independent truth:
//! - **Weekly / monthly**: logged and on-time totals over records dated within
//!   the last 7 / 30 days (inclusive of today)
//! - **Consecutive days without missing**: the all-prayers backward scan
//! - **Last missed prayer**: most recent recorded date with an unlogged prayer

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::adherence::AdherenceRecords;
use crate::streak::{backward_scan, StreakStates, MAX_SCAN_DAYS};

pub const WEEK_DAYS: u64 = 7;
pub const MONTH_DAYS: u64 = 30;

/// Totals over a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodStats {
    /// Window length in days
    pub days: u64,
    /// Prayers marked as performed
    pub total_logged: u32,
    /// Prayers marked as performed on time
    pub total_on_time: u32,
    /// `round(on_time / logged * 100)`, 0 when nothing was logged
    pub percentage: u32,
}

impl PeriodStats {
    fn percentage_of(on_time: u32, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        (on_time as f64 / total as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub today: NaiveDate,
    pub weekly: PeriodStats,
    pub monthly: PeriodStats,
    pub consecutive_days_without_missing: u32,
    pub last_missed_prayer: Option<NaiveDate>,
    pub total_days_tracked: usize,
    pub streaks: StreakStates,
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Sum logged/on-time counts over records dated in `[today - days, today]`.
    pub fn period(records: &AdherenceRecords, today: NaiveDate, days: u64) -> PeriodStats {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        let (total_logged, total_on_time) = records
            .range(from..=today)
            .fold((0, 0), |(logged, on_time), (_, record)| {
                (logged + record.logged_count(), on_time + record.on_time_count())
            });

        PeriodStats {
            days,
            total_logged,
            total_on_time,
            percentage: PeriodStats::percentage_of(total_on_time, total_logged),
        }
    }

    pub fn weekly(records: &AdherenceRecords, today: NaiveDate) -> PeriodStats {
        Self::period(records, today, WEEK_DAYS)
    }

    pub fn monthly(records: &AdherenceRecords, today: NaiveDate) -> PeriodStats {
        Self::period(records, today, MONTH_DAYS)
    }

    pub fn consecutive_days_without_missing(records: &AdherenceRecords, today: NaiveDate) -> u32 {
        backward_scan(records, today, |record| record.all_logged())
    }

    /// Most recent date within the scan window whose record has at least one
    /// unlogged prayer. Dates without a record are not counted as misses.
    pub fn last_missed_prayer(records: &AdherenceRecords, today: NaiveDate) -> Option<NaiveDate> {
        let from = today
            .checked_sub_days(Days::new(MAX_SCAN_DAYS as u64 - 1))
            .unwrap_or(NaiveDate::MIN);
        records
            .range(from..=today)
            .rev()
            .find(|(_, record)| !record.all_logged())
            .map(|(date, _)| *date)
    }

    pub fn snapshot(
        records: &AdherenceRecords,
        today: NaiveDate,
        streaks: StreakStates,
    ) -> StatisticsSnapshot {
        StatisticsSnapshot {
            today,
            weekly: Self::weekly(records, today),
            monthly: Self::monthly(records, today),
            consecutive_days_without_missing: Self::consecutive_days_without_missing(records, today),
            last_missed_prayer: Self::last_missed_prayer(records, today),
            total_days_tracked: records.len(),
            streaks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adherence::DailyAdherenceRecord;
    use crate::prayer::Prayer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: NaiveDate, logged: &[Prayer], on_time: &[Prayer]) -> DailyAdherenceRecord {
        let mut record = DailyAdherenceRecord::new(day);
        for prayer in logged {
            let log = match prayer {
                Prayer::Fajr => &mut record.fajr,
                Prayer::Dhuhr => &mut record.dhuhr,
                Prayer::Asr => &mut record.asr,
                Prayer::Maghrib => &mut record.maghrib,
                Prayer::Isha => &mut record.isha,
            };
            log.logged = true;
            log.on_time = on_time.contains(prayer);
        }
        record
    }

    fn insert(records: &mut AdherenceRecords, rec: DailyAdherenceRecord) {
        records.insert(rec.date, rec);
    }

    #[test]
    fn empty_history_is_zero_not_nan() {
        let records = AdherenceRecords::new();
        let today = date(2024, 3, 10);
        let weekly = StatisticsAggregator::weekly(&records, today);
        assert_eq!(weekly.total_logged, 0);
        assert_eq!(weekly.percentage, 0);
        assert_eq!(StatisticsAggregator::monthly(&records, today).percentage, 0);
        assert_eq!(StatisticsAggregator::last_missed_prayer(&records, today), None);
    }

    #[test]
    fn percentage_rounds() {
        let today = date(2024, 3, 10);
        let mut records = AdherenceRecords::new();
        // 2 of 3 on time: 66.67 rounds to 67
        insert(
            &mut records,
            record(today, &[Prayer::Fajr, Prayer::Dhuhr, Prayer::Asr], &[Prayer::Fajr, Prayer::Asr]),
        );
        let weekly = StatisticsAggregator::weekly(&records, today);
        assert_eq!(weekly.total_logged, 3);
        assert_eq!(weekly.total_on_time, 2);
        assert_eq!(weekly.percentage, 67);
    }

    #[test]
    fn windows_include_boundary_and_exclude_older() {
        let today = date(2024, 3, 31);
        let mut records = AdherenceRecords::new();
        insert(&mut records, record(date(2024, 3, 24), &Prayer::ALL, &Prayer::ALL));
        insert(&mut records, record(date(2024, 3, 23), &Prayer::ALL, &[]));
        insert(&mut records, record(date(2024, 3, 1), &[Prayer::Fajr], &[]));
        insert(&mut records, record(date(2024, 2, 29), &[Prayer::Fajr], &[]));

        let weekly = StatisticsAggregator::weekly(&records, today);
        assert_eq!(weekly.total_logged, 5);
        assert_eq!(weekly.percentage, 100);

        let monthly = StatisticsAggregator::monthly(&records, today);
        assert_eq!(monthly.total_logged, 11);
        assert_eq!(monthly.total_on_time, 5);
        assert_eq!(monthly.percentage, 45);
    }

    #[test]
    fn future_records_are_ignored() {
        let today = date(2024, 3, 10);
        let mut records = AdherenceRecords::new();
        insert(&mut records, record(date(2024, 3, 11), &Prayer::ALL, &Prayer::ALL));
        assert_eq!(StatisticsAggregator::weekly(&records, today).total_logged, 0);
    }

    #[test]
    fn last_missed_is_most_recent_incomplete_day() {
        let today = date(2024, 3, 10);
        let mut records = AdherenceRecords::new();
        insert(&mut records, record(date(2024, 3, 5), &[Prayer::Fajr], &[]));
        insert(&mut records, record(date(2024, 3, 7), &[Prayer::Fajr, Prayer::Isha], &[]));
        insert(&mut records, record(date(2024, 3, 9), &Prayer::ALL, &[]));
        insert(&mut records, record(today, &Prayer::ALL, &[]));

        assert_eq!(
            StatisticsAggregator::last_missed_prayer(&records, today),
            Some(date(2024, 3, 7))
        );
        // 3/8 has no record, so the unbroken run is 3/9..=3/10
        assert_eq!(StatisticsAggregator::consecutive_days_without_missing(&records, today), 2);
    }

    #[test]
    fn last_missed_outside_window_is_none() {
        let today = date(2024, 3, 10);
        let mut records = AdherenceRecords::new();
        insert(&mut records, record(date(2022, 1, 1), &[Prayer::Fajr], &[]));
        assert_eq!(StatisticsAggregator::last_missed_prayer(&records, today), None);
    }

    #[test]
    fn snapshot_carries_counts() {
        let today = date(2024, 3, 10);
        let mut records = AdherenceRecords::new();
        insert(&mut records, record(today, &Prayer::ALL, &Prayer::ALL));
        insert(&mut records, record(date(2024, 1, 1), &[Prayer::Fajr], &[]));

        let snapshot = StatisticsAggregator::snapshot(&records, today, StreakStates::new());
        assert_eq!(snapshot.total_days_tracked, 2);
        assert_eq!(snapshot.consecutive_days_without_missing, 1);
        assert_eq!(snapshot.weekly.percentage, 100);
        assert_eq!(snapshot.last_missed_prayer, Some(date(2024, 1, 1)));
    }
}
