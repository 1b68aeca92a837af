use chrono::{NaiveDate, Utc};
use clap::Args;

use super::{parse_date, print_json, CmdResult, Context};

#[derive(Args)]
pub struct StatusArgs {
    /// Date (YYYY-MM-DD); defaults to today at the saved location
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

pub fn run(args: StatusArgs) -> CmdResult {
    let ctx = Context::open()?;
    let status = ctx.tracker().status(args.date, Utc::now())?;
    print_json(&status)
}
