use chrono::{NaiveDate, Utc};
use clap::Args;
use salat_core::storage::Database;
use salat_core::{Prayer, PrayerTracker, TimetableService};

use super::{parse_date, print_json, CmdResult};

#[derive(Args)]
pub struct LogArgs {
    /// fajr, dhuhr, asr, maghrib or isha
    prayer: Prayer,
    /// Performed, but outside its on-time window
    #[arg(long)]
    late: bool,
    /// Date (YYYY-MM-DD); defaults to today at the saved location
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

pub fn run(args: LogArgs) -> CmdResult {
    let db = Database::open()?;
    // Logging never computes times, so it works without a timetable.
    let timetable = TimetableService::default();
    let tracker = PrayerTracker::new(&db, &timetable);

    let outcome = tracker.log_prayer(args.prayer, !args.late, args.date, Utc::now())?;
    print_json(&outcome)
}
