//! Service wiring and lifecycle
//!
//! Builds the pool and every service once at startup and hands them out
//! through `AppState`.

use crate::database::{create_pool, StateStore};
use crate::error::Result;
use crate::services::{
    HistoryService, HydrationService, MedicationsService, NotificationsService, RemindersService,
    SchedulerService,
};
use std::path::PathBuf;

/// Shared handle to every service
#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub medications: MedicationsService,
    pub hydration: HydrationService,
    pub history: HistoryService,
    pub notifications: NotificationsService,
    pub reminders: RemindersService,
    pub scheduler: SchedulerService,
    pub data_dir: PathBuf,
}

/// Build the store and services. Called once on startup.
pub async fn setup(data_dir: PathBuf) -> Result<AppState> {
    tracing::info!("Starting up, data directory {:?}", data_dir);

    std::fs::create_dir_all(&data_dir)?;

    let pool = create_pool(&data_dir.join("medwatch.db")).await?;
    let store = StateStore::new(pool);

    let notifications = NotificationsService::new();
    let history = HistoryService::new(store.clone());
    let reminders = RemindersService::new(store.clone(), notifications.clone());
    let medications = MedicationsService::new(
        store.clone(),
        history.clone(),
        notifications.clone(),
        reminders.clone(),
    );
    let hydration = HydrationService::new(
        store.clone(),
        history.clone(),
        notifications.clone(),
        reminders.clone(),
    );
    let scheduler = SchedulerService::new().await?;

    tracing::info!("Services initialized");

    Ok(AppState {
        store,
        medications,
        hydration,
        history,
        notifications,
        reminders,
        scheduler,
        data_dir,
    })
}

impl AppState {
    /// Arm reminder timers from persisted state and start the daily
    /// rollover job.
    pub async fn start(&self) -> Result<()> {
        self.reminders.restore().await?;
        self.scheduler.schedule_rollover(self.hydration.clone()).await?;
        self.scheduler.start().await?;
        Ok(())
    }

    /// Stop every timer and scheduled job.
    pub async fn shutdown(&self) -> Result<()> {
        self.reminders.shutdown().await;
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
