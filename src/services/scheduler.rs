//! Rollover scheduler
//!
//! Runs the daily midnight job that starts a fresh hydration day, using
//! cron scheduling.

use crate::config::ROLLOVER_CRON;
use crate::error::{AppError, Result};
use crate::services::hydration::HydrationService;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Scheduler service for the daily rollover job
#[derive(Clone)]
pub struct SchedulerService {
    scheduler: Arc<RwLock<JobScheduler>>,
    rollover_job_id: Arc<RwLock<Option<Uuid>>>,
}

impl SchedulerService {
    /// Create the scheduler. No jobs run until `start`.
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            rollover_job_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Start ticking scheduled jobs.
    pub async fn start(&self) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Rollover scheduler started");
        Ok(())
    }

    /// Schedule the job that resets the hydration day at local midnight.
    pub async fn schedule_rollover(&self, hydration: HydrationService) -> Result<()> {
        // Only one rollover job at a time
        self.cancel_rollover().await?;

        let hydration = Arc::new(hydration);

        // The cron expression is evaluated in local time; midnight here
        // means the user's midnight, not UTC's
        let job = Job::new_async_tz(ROLLOVER_CRON, Local, move |_uuid, _l| {
            let hydration = Arc::clone(&hydration);
            Box::pin(async move {
                tracing::info!("Running daily hydration rollover");

                if let Err(e) = hydration.reset_daily().await {
                    tracing::error!("Daily hydration rollover failed: {}", e);
                }
            })
        })
        .map_err(|e| AppError::Scheduler(format!("Failed to create rollover job: {}", e)))?;

        let job_id = job.guid();

        // Lock order is job id first, then scheduler, same as every
        // other method here
        let mut current_job = self.rollover_job_id.write().await;
        let scheduler = self.scheduler.write().await;
        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to schedule rollover job: {}", e)))?;

        *current_job = Some(job_id);

        tracing::info!("Daily rollover scheduled ({})", ROLLOVER_CRON);
        Ok(())
    }

    /// Cancel the scheduled rollover job.
    pub async fn cancel_rollover(&self) -> Result<()> {
        let mut current_job = self.rollover_job_id.write().await;

        if let Some(job_id) = *current_job {
            let scheduler = self.scheduler.write().await;
            scheduler
                .remove(&job_id)
                .await
                .map_err(|e| AppError::Scheduler(format!("Failed to remove rollover job: {}", e)))?;

            *current_job = None;
            tracing::info!("Daily rollover cancelled");
        }

        Ok(())
    }

    /// When the rollover job will next run, in local time. None when no
    /// rollover is scheduled.
    pub async fn next_rollover(&self) -> Result<Option<DateTime<Local>>> {
        let current_job = self.rollover_job_id.read().await;

        let job_id = match *current_job {
            Some(job_id) => job_id,
            None => return Ok(None),
        };

        let mut scheduler = self.scheduler.write().await;
        let tick = scheduler
            .next_tick_for_job(job_id)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to query rollover tick: {}", e)))?;

        Ok(tick.map(|tick| tick.with_timezone(&Local)))
    }

    /// Stop the scheduler and drop its jobs.
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Rollover scheduler shutdown");
        Ok(())
    }
}
