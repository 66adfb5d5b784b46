//! Deadline polling and one-shot reminder delivery.
//!
//! # Responsibility
//! - Detect active tasks whose deadline has passed and notify once per task.
//! - Drive periodic checks from an injectable clock.
//!
//! # Invariants
//! - A task is handed to the notification sink at most once: `notified` is set
//!   in the same tick, before any later tick can observe the task.
//! - Deadlines missed while polling was stopped are caught up on the next tick.
//! - Sink failures are logged and swallowed; they never block the flag update.

use crate::clock::Clock;
use crate::model::settings::Settings;
use crate::model::task::TaskId;
use crate::notify::{AlertSink, Notification, NotificationSink, Permission};
use crate::repo::kv_store::{KeyValueStore, StorageResult};
use crate::repo::settings_store::load_settings;
use crate::repo::task_store::TaskStore;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Time between deadline checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Result of one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tasks whose reminder fired in this tick, in store order.
    pub notified: Vec<TaskId>,
    /// Platform notifications actually delivered (permission granted, no error).
    pub delivered: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}

pub struct ReminderScheduler<N: NotificationSink, A: AlertSink> {
    notifier: N,
    alerts: A,
    settings: Settings,
    permission_requested: bool,
}

impl<N: NotificationSink, A: AlertSink> ReminderScheduler<N, A> {
    pub fn new(notifier: N, alerts: A, settings: Settings) -> Self {
        Self {
            notifier,
            alerts,
            settings,
            permission_requested: false,
        }
    }

    /// Requests notification permission once if it is not already granted.
    pub fn ensure_permission(&mut self) -> Permission {
        let current = self.notifier.permission();
        if current == Permission::Granted || self.permission_requested {
            return current;
        }

        self.permission_requested = true;
        let granted = self.notifier.request_permission();
        info!("event=notify_permission module=reminder status=requested result={granted:?}");
        granted
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    /// Fires reminders for every active, unnotified task due at `now`.
    ///
    /// Persists once when at least one task changed. Repeated calls are
    /// idempotent for tasks already notified.
    ///
    /// # Errors
    /// - Returns `StorageError` when the save fails; `notified` flags stay set
    ///   in memory so reminders are not repeated.
    pub fn tick<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        now: DateTime<Utc>,
    ) -> StorageResult<TickReport> {
        let mut report = TickReport::default();

        for task in store.tasks_mut() {
            if !task.reminder_due(now) {
                continue;
            }

            let notification = Notification::for_task(task);
            if self.dispatch(task.id, &notification) {
                report.delivered += 1;
            }
            task.mark_notified();
            report.notified.push(task.id);
        }

        if report.is_empty() {
            return Ok(report);
        }

        store.save_all()?;
        info!(
            "event=reminder_tick module=reminder status=ok notified={} delivered={}",
            report.notified.len(),
            report.delivered
        );
        Ok(report)
    }

    fn dispatch(&mut self, id: TaskId, notification: &Notification) -> bool {
        let delivered = match self.notifier.permission() {
            Permission::Granted => match self.notifier.deliver(notification) {
                Ok(()) => true,
                Err(err) => {
                    warn!("event=reminder_deliver module=reminder status=error task_id={id} error={err}");
                    false
                }
            },
            other => {
                debug!("event=reminder_deliver module=reminder status=skipped task_id={id} permission={other:?}");
                false
            }
        };

        if self.settings.sound {
            if let Err(err) = self.alerts.play_sound() {
                warn!("event=reminder_sound module=reminder status=error task_id={id} error={err}");
            }
        }
        if self.settings.vibrate {
            if let Err(err) = self.alerts.vibrate() {
                warn!("event=reminder_vibrate module=reminder status=error task_id={id} error={err}");
            }
        }

        delivered
    }
}

/// Fixed-interval driver for `ReminderScheduler::tick`.
pub struct PollingLoop<C: Clock> {
    clock: C,
    interval: Duration,
}

impl<C: Clock> PollingLoop<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self { clock, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks until `stop` is raised, calling `wait` between ticks.
    ///
    /// Before each tick the store is brought up to date: a store left
    /// non-durable by a failed save is resynced first, then reloaded so
    /// writes made by other processes are seen. Settings are re-read from the
    /// same backend, so alert toggles apply from the next tick. Storage errors
    /// are logged and polling continues. Returns the number of ticks run.
    pub fn run<S, N, A>(
        &self,
        scheduler: &mut ReminderScheduler<N, A>,
        store: &mut TaskStore<S>,
        stop: &AtomicBool,
        mut wait: impl FnMut(Duration),
    ) -> usize
    where
        S: KeyValueStore,
        N: NotificationSink,
        A: AlertSink,
    {
        scheduler.ensure_permission();
        info!(
            "event=poll_start module=reminder status=ok interval_ms={}",
            self.interval.as_millis()
        );

        let mut ticks = 0;
        while !stop.load(Ordering::SeqCst) {
            if !store.is_durable() {
                if let Err(err) = store.resync() {
                    warn!("event=tasks_resync module=reminder status=error error={err}");
                }
            }
            store.reload();
            scheduler.set_settings(load_settings(store.backend()));
            if let Err(err) = scheduler.tick(store, self.clock.now()) {
                warn!("event=reminder_tick module=reminder status=error error={err}");
            }
            ticks += 1;

            if stop.load(Ordering::SeqCst) {
                break;
            }
            wait(self.interval);
        }

        info!("event=poll_stop module=reminder status=ok ticks={ticks}");
        ticks
    }
}
