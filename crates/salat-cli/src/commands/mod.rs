pub mod config;
pub mod location;
pub mod log;
pub mod notify;
pub mod settings;
pub mod stats;
pub mod status;
pub mod times;

use chrono::{Duration, NaiveDate};
use salat_core::storage::Database;
use salat_core::{Config, PrayerTracker, TimetableService};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a time-based command needs: the store, the config and the
/// timetable the astronomy adapter serves from.
pub struct Context {
    pub db: Database,
    pub config: Config,
    pub timetable: TimetableService,
}

impl Context {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let timetable = TimetableService::load(&config.timetable_path()?)?;
        Ok(Self {
            db,
            config,
            timetable,
        })
    }

    pub fn tracker(&self) -> PrayerTracker<'_> {
        PrayerTracker::new(&self.db, &self.timetable).with_current_window(Duration::minutes(
            i64::from(self.config.status.current_window_min),
        ))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// clap parser for `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
