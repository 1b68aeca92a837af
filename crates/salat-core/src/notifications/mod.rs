//! Reminder scheduling and delivery.
//!
//! - [`NotificationScheduler`] turns a day's instants and the user's
//!   [`NotificationPreferences`] into persisted [`ScheduledNotification`]s.
//! - [`NotificationPump`] fires due reminders through a [`NotificationSink`]
//!   and applies the retention policy.

mod preferences;
mod pump;
mod scheduler;
mod sink;

pub use preferences::{NotificationPreference, NotificationPreferences, TimingOffset};
pub use pump::{NotificationPump, PumpSettings, PumpStopper};
pub use scheduler::{NotificationScheduler, ScheduleReport, ScheduledNotification};
pub use sink::{NotificationSink, Permission};

#[cfg(test)]
pub(crate) use sink::RecordingSink;
