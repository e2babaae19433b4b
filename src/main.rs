// medwatch - medication and hydration reminder daemon
// Entry point and runtime setup

use medwatch::app::{self, AppState};
use medwatch::dose;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging first so setup failures are visible
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medwatch=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting medwatch daemon");

    let state = app::setup(data_dir()?).await?;
    state.start().await?;

    log_status(&state).await?;

    // Stream notifications to the log until shutdown
    let mut events = state.notifications.subscribe();
    let event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(notification) => {
                    tracing::info!("[{}] {}", notification.title, notification.body);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Notification stream lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    event_task.abort();
    state.shutdown().await?;

    tracing::info!("medwatch stopped");
    Ok(())
}

/// Resolve the data directory: env override first, then the platform
/// data dir.
fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("MEDWATCH_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .map(|dir| dir.join("medwatch"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))
}

/// Log the current medication and hydration status at startup.
async fn log_status(state: &AppState) -> anyhow::Result<()> {
    let now = chrono::Local::now().time();

    let medications = state.medications.list_medications().await?;
    if medications.is_empty() {
        tracing::info!("No medications configured");
    }

    for medication in &medications {
        let status = dose::classify_dose(&medication.next_dose, now);
        tracing::info!(
            "{} {} - next dose {} ({})",
            medication.name,
            medication.dosage,
            medication.next_dose,
            status.label
        );
        tracing::debug!(
            "{} last taken: {}",
            medication.name,
            dose::describe_time_since(medication.last_taken, chrono::Utc::now())
        );
    }

    let progress = state.hydration.progress().await?;
    tracing::info!(
        "Hydration: {} of {} glasses ({}) - {}",
        progress.intake,
        progress.goal,
        progress.display,
        progress.label
    );

    if let Some(next) = state.scheduler.next_rollover().await? {
        tracing::info!("Next hydration rollover at {}", next.format("%Y-%m-%d %H:%M"));
    }

    Ok(())
}
