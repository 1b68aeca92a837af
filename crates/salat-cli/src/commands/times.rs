use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;

use super::{parse_date, print_json, CmdResult, Context};

#[derive(Args)]
pub struct TimesArgs {
    /// Date (YYYY-MM-DD); defaults to today at the saved location
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct TimeEntry {
    name: &'static str,
    /// Local `HH:MM`.
    time: String,
    instant: DateTime<Utc>,
}

#[derive(Serialize)]
struct TimesOutput {
    date: NaiveDate,
    timezone: String,
    times: Vec<TimeEntry>,
}

pub fn run(args: TimesArgs) -> CmdResult {
    let ctx = Context::open()?;
    let tracker = ctx.tracker();
    let date = match args.date {
        Some(date) => date,
        None => tracker.local_date(Utc::now())?,
    };

    let instants = tracker.instants(date)?;
    let times = instants
        .iter()
        .map(|(key, instant)| TimeEntry {
            name: key.as_str(),
            time: instants.local(key).format("%H:%M").to_string(),
            instant,
        })
        .collect();

    print_json(&TimesOutput {
        date,
        timezone: instants.timezone.name().to_string(),
        times,
    })
}
