use chrono::{DateTime, Days, NaiveDate, Utc};
use clap::Subcommand;
use salat_core::error::NotificationError;
use salat_core::{
    Event, NotificationPreference, NotificationPump, NotificationScheduler, NotificationSink,
    Permission, Prayer, PrayerTracker, ProfileStore, PumpSettings, ScheduledNotification,
    TimingOffset,
};

use super::{parse_date, print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show reminder preferences, or change one prayer's preference
    Prefs {
        /// Prayer to change
        #[arg(long)]
        prayer: Option<Prayer>,
        /// Enable or disable the reminder ("true"/"false")
        #[arg(long)]
        enabled: Option<bool>,
        /// at, before15, before30, after15 or after30
        #[arg(long)]
        timing: Option<TimingOffset>,
    },
    /// Schedule reminders for a day (today by default)
    Schedule {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// List scheduled reminders
    List {
        /// Only reminders that are active and not yet fired
        #[arg(long)]
        pending: bool,
    },
    /// Cancel one reminder by id, or every reminder of a date
    Cancel {
        id: Option<String>,
        #[arg(long, value_parser = parse_date, conflicts_with = "id")]
        date: Option<NaiveDate>,
    },
    /// Deliver due reminders until interrupted
    Watch {
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },
}

/// Presents reminders on the controlling terminal.
#[derive(Debug, Default)]
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn present(&mut self, notification: &ScheduledNotification) -> Result<(), NotificationError> {
        eprintln!("\x07[{}] {}", notification.title, notification.message);
        Ok(())
    }
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "failed to encode event"),
    }
}

pub fn run(action: NotifyAction) -> CmdResult {
    match action {
        NotifyAction::Prefs {
            prayer,
            enabled,
            timing,
        } => {
            let db = salat_core::Database::open()?;
            let profile = ProfileStore::new(&db);
            let prefs = match prayer {
                Some(prayer) => {
                    let current = profile.preferences()?.get(prayer);
                    profile.set_preference(NotificationPreference {
                        prayer,
                        enabled: enabled.unwrap_or(current.enabled),
                        timing: timing.unwrap_or(current.timing),
                    })?
                }
                None if enabled.is_some() || timing.is_some() => {
                    return Err("--enabled and --timing require --prayer".into());
                }
                None => profile.preferences()?,
            };
            print_json(&prefs)
        }
        NotifyAction::Schedule { date } => {
            let ctx = Context::open()?;
            let tracker = ctx.tracker();
            let now = Utc::now();
            let report = match date {
                Some(date) => tracker.schedule_for(date, now)?,
                None => tracker.schedule_today(now)?,
            };
            print_json(&report)
        }
        NotifyAction::List { pending } => {
            let db = salat_core::Database::open()?;
            let scheduler = NotificationScheduler::new(&db);
            let entries = if pending {
                scheduler.pending()?
            } else {
                scheduler.entries()?
            };
            print_json(&entries)
        }
        NotifyAction::Cancel { id, date } => {
            let db = salat_core::Database::open()?;
            let scheduler = NotificationScheduler::new(&db);
            let cancelled = match (id, date) {
                (Some(id), None) => {
                    if scheduler.cancel(&id)? {
                        vec![id]
                    } else {
                        return Err(format!("no active reminder with id '{id}'").into());
                    }
                }
                (None, Some(date)) => scheduler.cancel_for_date(date)?,
                _ => return Err("pass a reminder id or --date".into()),
            };
            let now = Utc::now();
            for id in cancelled {
                print_event(&Event::ReminderCancelled { id, at: now });
            }
            Ok(())
        }
        NotifyAction::Watch { once } => watch(once),
    }
}

/// Schedule today and tomorrow at the saved location. Only passes that
/// created something are reported.
fn arm(tracker: &PrayerTracker<'_>, now: DateTime<Utc>) -> salat_core::error::Result<Vec<Event>> {
    let today = tracker.local_date(now)?;
    let mut events = Vec::new();
    for date in [Some(today), today.checked_add_days(Days::new(1))].into_iter().flatten() {
        match tracker.schedule_for(date, now) {
            Ok(report) if !report.created.is_empty() => events.extend(report.event(now)),
            Ok(_) => {}
            Err(e) => tracing::warn!(%date, error = %e, "could not schedule reminders"),
        }
    }
    Ok(events)
}

fn watch(once: bool) -> CmdResult {
    let ctx = Context::open()?;
    let tracker = ctx.tracker();
    let mut pump = NotificationPump::new(
        &ctx.db,
        TerminalSink,
        PumpSettings::from(&ctx.config.pump),
    );

    if once {
        let now = Utc::now();
        arm(&tracker, now)?.iter().for_each(print_event);
        pump.start(now)?.iter().for_each(print_event);
        print_event(&pump.stop(now));
        return Ok(());
    }

    // Re-armed before every tick so a watch left running crosses midnight.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stopper = pump.stopper();
    runtime.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stopper.stop();
            }
        });
        pump.run(|now| arm(&tracker, now), print_event).await
    })?;
    Ok(())
}
