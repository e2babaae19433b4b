//! Reminder timers
//!
//! One background task per reminder, keyed by what it reminds about.
//! Each task sleeps its interval, re-reads persisted state, and raises a
//! notification if the entity still exists with reminders enabled.
//! Intervals missed while the process was down are not replayed.

use crate::config::{MIN_REMINDER_INTERVAL_SECS, WAKING_MINUTES_PER_DAY};
use crate::database::{HydrationState, Medication, StateStore};
use crate::error::Result;
use crate::services::notifications::NotificationsService;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// What a timer reminds about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReminderKey {
    Medication(String),
    Hydration,
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderKey::Medication(id) => write!(f, "medication/{}", id),
            ReminderKey::Hydration => write!(f, "hydration"),
        }
    }
}

/// Reminder timer service
#[derive(Clone)]
pub struct RemindersService {
    store: StateStore,
    notifications: NotificationsService,
    timers: Arc<Mutex<HashMap<ReminderKey, JoinHandle<()>>>>,
    snoozes: Arc<Mutex<HashMap<ReminderKey, JoinHandle<()>>>>,
}

impl RemindersService {
    pub fn new(store: StateStore, notifications: NotificationsService) -> Self {
        Self {
            store,
            notifications,
            timers: Arc::new(Mutex::new(HashMap::new())),
            snoozes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Interval between reminders for a medication, floored so a
    /// misconfigured frequency cannot busy-loop the timer.
    pub fn medication_interval(frequency_hours: f32) -> Duration {
        let secs = ((frequency_hours * 3600.0) as u64).max(MIN_REMINDER_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    /// Interval between hydration reminders. A custom frequency wins;
    /// otherwise the daily goal is spread over a 16-hour waking day.
    pub fn hydration_interval(state: &HydrationState) -> Duration {
        let minutes = match state.custom_frequency_hours {
            Some(hours) => ((hours * 60.0) as u64).max(1),
            None => ((WAKING_MINUTES_PER_DAY / state.goal.max(1) as f32) as u64).max(1),
        };

        Duration::from_secs(minutes * 60)
    }

    /// Arm the repeating reminder for a medication, replacing any existing
    /// timer for it. A disabled medication is left unarmed.
    pub async fn schedule_medication(&self, medication: &Medication) {
        let key = ReminderKey::Medication(medication.id.clone());
        self.cancel(&key).await;

        if !medication.reminders_enabled {
            tracing::debug!("Reminders disabled for {}, not scheduling", medication.name);
            return;
        }

        let interval = Self::medication_interval(medication.frequency_hours);
        let store = self.store.clone();
        let notifications = self.notifications.clone();
        let id = medication.id.clone();

        tracing::info!(
            "Scheduling medication reminder for {} every {}s",
            medication.name,
            interval.as_secs()
        );

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let medications = match store.load_medications().await {
                    Ok(medications) => medications,
                    Err(e) => {
                        tracing::error!("Failed to load medications for reminder: {}", e);
                        continue;
                    }
                };

                let medication = match medications.into_iter().find(|m| m.id == id) {
                    Some(medication) => medication,
                    None => {
                        tracing::warn!("Medication {} no longer exists, stopping reminder", id);
                        break;
                    }
                };

                if !medication.reminders_enabled {
                    tracing::debug!("Reminders disabled for {}, stopping timer", medication.name);
                    break;
                }

                notifications.notify_medication(&medication).await;
            }
        });

        self.timers.lock().await.insert(key, handle);
    }

    /// Arm the repeating hydration reminder. The timer re-reads state every
    /// tick and retires itself once the goal is reached or reminders are
    /// turned off.
    pub async fn schedule_hydration(&self, state: &HydrationState) {
        self.cancel(&ReminderKey::Hydration).await;

        if !state.reminders_enabled {
            tracing::debug!("Hydration reminders disabled, not scheduling");
            return;
        }

        let interval = Self::hydration_interval(state);
        let store = self.store.clone();
        let notifications = self.notifications.clone();

        tracing::info!(
            "Scheduling hydration reminder every {} minutes",
            interval.as_secs() / 60
        );

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let state = match store.load_hydration().await {
                    Ok(state) => state,
                    Err(e) => {
                        tracing::error!("Failed to load hydration state for reminder: {}", e);
                        continue;
                    }
                };

                if !state.reminders_enabled {
                    tracing::debug!("Hydration reminders disabled, stopping timer");
                    break;
                }

                if state.daily_intake >= state.goal {
                    tracing::info!("Hydration goal reached, stopping reminders for today");
                    break;
                }

                notifications.notify_hydration().await;
            }
        });

        self.timers.lock().await.insert(ReminderKey::Hydration, handle);
    }

    /// Schedule a one-shot snoozed reminder. A newer snooze for the same
    /// key replaces the pending one. The snooze fires even if reminders
    /// were disabled in the meantime, since the user asked for it.
    pub async fn schedule_snooze(&self, key: ReminderKey, minutes: u32) {
        let mut snoozes = self.snoozes.lock().await;

        if let Some(handle) = snoozes.remove(&key) {
            handle.abort();
            tracing::debug!("Replaced pending snooze for {}", key);
        }

        tracing::info!("Snoozing {} for {} minutes", key, minutes);

        let store = self.store.clone();
        let notifications = self.notifications.clone();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;

            match &task_key {
                ReminderKey::Medication(id) => {
                    let medications = match store.load_medications().await {
                        Ok(medications) => medications,
                        Err(e) => {
                            tracing::error!("Failed to load medications for snooze: {}", e);
                            return;
                        }
                    };

                    match medications.into_iter().find(|m| m.id == *id) {
                        Some(medication) => {
                            notifications.notify_medication(&medication).await;
                        }
                        None => {
                            tracing::warn!("Medication {} no longer exists, dropping snooze", id);
                        }
                    }
                }
                ReminderKey::Hydration => {
                    notifications.notify_hydration().await;
                }
            }
        });

        snoozes.insert(key, handle);
    }

    /// Cancel the repeating timer and any pending snooze for a key.
    pub async fn cancel(&self, key: &ReminderKey) {
        if let Some(handle) = self.timers.lock().await.remove(key) {
            handle.abort();
            tracing::debug!("Cancelled reminder timer for {}", key);
        }

        if let Some(handle) = self.snoozes.lock().await.remove(key) {
            handle.abort();
            tracing::debug!("Cancelled pending snooze for {}", key);
        }
    }

    /// Re-arm timers from persisted state. Called once at startup.
    pub async fn restore(&self) -> Result<()> {
        let medications = self.store.load_medications().await?;
        let mut armed = 0;

        for medication in &medications {
            if medication.reminders_enabled {
                self.schedule_medication(medication).await;
                armed += 1;
            }
        }

        let hydration = self.store.load_hydration().await?;
        if hydration.reminders_enabled && hydration.daily_intake < hydration.goal {
            self.schedule_hydration(&hydration).await;
            armed += 1;
        }

        tracing::info!("Restored {} reminder timer(s)", armed);
        Ok(())
    }

    /// Abort every timer and pending snooze.
    pub async fn shutdown(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }

        let mut snoozes = self.snoozes.lock().await;
        for (_, handle) in snoozes.drain() {
            handle.abort();
        }

        tracing::info!("All reminder timers stopped");
    }

    /// Whether a repeating timer is currently armed for a key.
    pub async fn is_scheduled(&self, key: &ReminderKey) -> bool {
        self.timers.lock().await.contains_key(key)
    }
}
