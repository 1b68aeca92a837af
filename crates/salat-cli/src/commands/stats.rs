use chrono::Utc;
use salat_core::storage::Database;
use salat_core::{PrayerTracker, TimetableService};

use super::{print_json, CmdResult};

/// Which derived view of the adherence history to print.
pub enum StatsView {
    Summary,
    Streaks,
    History,
}

pub fn run(view: StatsView) -> CmdResult {
    let db = Database::open()?;
    // Statistics only read adherence records; no prayer times are needed.
    let timetable = TimetableService::default();
    let tracker = PrayerTracker::new(&db, &timetable);
    let now = Utc::now();

    match view {
        StatsView::Summary => print_json(&tracker.statistics(now)?),
        StatsView::Streaks => print_json(&tracker.streaks(now)?),
        StatsView::History => print_json(&tracker.history()?),
    }
}
