//! Reminder pump.
//!
//! The pump is an explicit object owned by the host: nothing runs until
//! [`NotificationPump::start`] (or [`NotificationPump::run`]) is called, and
//! [`PumpStopper::stop`] ends the loop.
//!
//! ## Firing order
//!
//! For each due reminder the pump persists `has_fired = true` first, then
//! presents it. If presentation fails the flag is rolled back so the next
//! tick retries. A crash between the two steps, or a failed rollback write,
//! drops a reminder instead of duplicating it.
//!
//! ## Retention
//!
//! On start, reminders scheduled more than `retention` ago are purged,
//! except active reminders that never fired.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use super::scheduler::ScheduledNotification;
use super::sink::{NotificationSink, Permission};
use crate::error::Result;
use crate::events::Event;
use crate::storage::{keys, read_json, update_json, KeyValueStore, PumpConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpSettings {
    pub interval: std::time::Duration,
    pub retention: chrono::Duration,
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(60),
            retention: chrono::Duration::days(7),
        }
    }
}

impl From<&PumpConfig> for PumpSettings {
    fn from(config: &PumpConfig) -> Self {
        Self {
            interval: std::time::Duration::from_secs(config.interval_secs.max(1)),
            retention: chrono::Duration::days(config.retention_days.max(1) as i64),
        }
    }
}

/// Cloneable handle that stops a running pump.
#[derive(Debug, Clone, Default)]
pub struct PumpStopper {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl PumpStopper {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct NotificationPump<'a, N: NotificationSink> {
    store: &'a dyn KeyValueStore,
    sink: N,
    settings: PumpSettings,
    stopper: PumpStopper,
    running: bool,
}

impl<'a, N: NotificationSink> NotificationPump<'a, N> {
    pub fn new(store: &'a dyn KeyValueStore, sink: N, settings: PumpSettings) -> Self {
        Self {
            store,
            sink,
            settings,
            stopper: PumpStopper::default(),
            running: false,
        }
    }

    pub fn stopper(&self) -> PumpStopper {
        self.stopper.clone()
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Prepare the pump: settle permission, purge old reminders, then fire
    /// whatever is already due.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        self.running = true;
        let mut events = vec![Event::PumpStarted { at: now }];

        let permission = match self.sink.permission() {
            Permission::Undetermined => self.sink.request_permission(),
            other => other,
        };
        if permission != Permission::Granted {
            tracing::warn!(?permission, "notification permission not granted; reminders stay pending");
        }

        let removed = self.cleanup(now)?;
        if removed > 0 {
            events.push(Event::RetentionPurged { removed, at: now });
        }

        events.extend(self.tick(now)?);
        Ok(events)
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> Event {
        self.running = false;
        self.stopper.stop();
        tracing::info!("reminder pump stopped");
        Event::PumpStopped { at: now }
    }

    /// Drop reminders older than the retention horizon unless they are
    /// still active and unfired. Returns how many were removed.
    pub fn cleanup(&self, now: DateTime<Utc>) -> Result<usize> {
        let horizon = now - self.settings.retention;
        let removed = update_json(
            self.store,
            keys::SCHEDULED_NOTIFICATIONS,
            |entries: &mut Vec<ScheduledNotification>| {
                let before = entries.len();
                entries.retain(|e| e.scheduled_instant >= horizon || (e.is_active && !e.has_fired));
                before - entries.len()
            },
        )?;
        if removed > 0 {
            tracing::info!(removed, "purged expired reminders");
        }
        Ok(removed)
    }

    /// Fire every due reminder once.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let entries: Vec<ScheduledNotification> =
            read_json(self.store, keys::SCHEDULED_NOTIFICATIONS)?;
        let due: Vec<String> = entries
            .iter()
            .filter(|e| e.is_due(now))
            .map(|e| e.id.clone())
            .collect();

        let mut events = Vec::new();
        for id in due {
            // Re-read before claiming: the entry may have been cancelled or
            // fired since the scan.
            let claimed = update_json(
                self.store,
                keys::SCHEDULED_NOTIFICATIONS,
                |entries: &mut Vec<ScheduledNotification>| -> Option<ScheduledNotification> {
                    let entry = entries.iter_mut().find(|e| e.id == id && e.is_due(now))?;
                    entry.has_fired = true;
                    entry.fired_at = Some(now);
                    Some(entry.clone())
                },
            )?;
            let Some(entry) = claimed else {
                continue;
            };

            match self.sink.present(&entry) {
                Ok(()) => {
                    tracing::info!(id = %entry.id, prayer = %entry.prayer, "reminder fired");
                    events.push(Event::ReminderFired {
                        id: entry.id.clone(),
                        prayer: entry.prayer,
                        at: now,
                    });
                }
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "reminder presentation failed, will retry");
                    if let Err(rollback) = self.release(&entry.id) {
                        tracing::error!(id = %entry.id, error = %rollback, "could not re-arm reminder");
                    }
                    events.push(Event::ReminderFailed {
                        id: entry.id.clone(),
                        error: e.to_string(),
                        at: now,
                    });
                }
            }
        }
        Ok(events)
    }

    /// Clear the fired mark of a claimed reminder so it is due again.
    fn release(&self, id: &str) -> Result<()> {
        update_json(
            self.store,
            keys::SCHEDULED_NOTIFICATIONS,
            |entries: &mut Vec<ScheduledNotification>| {
                if let Some(stored) = entries.iter_mut().find(|s| s.id == id) {
                    stored.has_fired = false;
                    stored.fired_at = None;
                }
            },
        )
    }

    /// Start, then tick every `interval` until stopped. Each tick runs to
    /// completion before the next one is awaited, so ticks never overlap.
    ///
    /// `before_tick` runs ahead of start and of every tick, so a long-lived
    /// host can keep scheduling the days it reaches. Its errors are logged
    /// and the tick proceeds.
    pub async fn run<H, F>(&mut self, mut before_tick: H, mut on_event: F) -> Result<()>
    where
        H: FnMut(DateTime<Utc>) -> Result<Vec<Event>>,
        F: FnMut(&Event),
    {
        let now = Utc::now();
        hook(&mut before_tick, now, &mut on_event);
        for event in self.start(now)? {
            on_event(&event);
        }

        let notify = self.stopper.notify.clone();
        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; start() already covered it.
        interval.tick().await;

        while !self.stopper.is_stopped() {
            tokio::select! {
                _ = interval.tick() => {
                    if self.stopper.is_stopped() {
                        break;
                    }
                    let now = Utc::now();
                    hook(&mut before_tick, now, &mut on_event);
                    match self.tick(now) {
                        Ok(events) => events.iter().for_each(&mut on_event),
                        Err(e) => tracing::warn!(error = %e, "reminder tick failed"),
                    }
                }
                _ = notify.notified() => {}
            }
        }

        on_event(&self.stop(Utc::now()));
        Ok(())
    }
}

fn hook<H, F>(before_tick: &mut H, now: DateTime<Utc>, on_event: &mut F)
where
    H: FnMut(DateTime<Utc>) -> Result<Vec<Event>>,
    F: FnMut(&Event),
{
    match before_tick(now) {
        Ok(events) => events.iter().for_each(on_event),
        Err(e) => tracing::warn!(error = %e, "pre-tick hook failed"),
    }
}
