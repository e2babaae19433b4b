//! Action history
//!
//! Newest-first log of user actions (doses taken or skipped, water
//! drunk). The history section is rewritten whole on every action, so
//! the log is capped.

use crate::config::{CLOCK_FORMAT, MAX_HISTORY_ENTRIES};
use crate::database::{HistoryCategory, HistoryEntry, StateStore};
use crate::error::Result;
use chrono::Local;
use uuid::Uuid;

/// Entry counts per category
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub medication: usize,
    pub hydration: usize,
}

/// Service for the action history log
#[derive(Clone)]
pub struct HistoryService {
    store: StateStore,
}

impl HistoryService {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Record an action, stamped with the current clock time.
    pub async fn record(
        &self,
        category: HistoryCategory,
        description: &str,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            category,
            description: description.to_string(),
            time: Local::now().format(CLOCK_FORMAT).to_string(),
        };

        let recorded = entry.clone();
        self.store
            .update_history(move |history| {
                history.insert(0, entry);
                history.truncate(MAX_HISTORY_ENTRIES);
            })
            .await?;

        tracing::debug!("Recorded history entry: {}", recorded.description);
        Ok(recorded)
    }

    /// List entries, newest first.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        self.store.load_history().await
    }

    /// Entry counts per category.
    pub async fn summary(&self) -> Result<HistorySummary> {
        let history = self.list().await?;

        let mut summary = HistorySummary {
            total: history.len(),
            ..Default::default()
        };

        for entry in &history {
            match entry.category {
                HistoryCategory::Medication => summary.medication += 1,
                HistoryCategory::Hydration => summary.hydration += 1,
            }
        }

        Ok(summary)
    }
}
