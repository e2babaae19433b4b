//! State store for the persisted sections
//!
//! All state lives in the `app_state` table as three named JSON blobs:
//! the medication list, the hydration state, and the action history.
//! Reads deserialize a whole section; writes serialize and rewrite it
//! whole. A missing or corrupt blob falls back to the section default
//! rather than surfacing an error.

use super::models::{HistoryEntry, HydrationState, Medication};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Section key for the medication list blob
pub const MEDICATIONS_KEY: &str = "medications";
/// Section key for the hydration state blob
pub const HYDRATION_KEY: &str = "hydration_state";
/// Section key for the action history blob
pub const HISTORY_KEY: &str = "history";

/// Store for the persisted state sections
#[derive(Clone)]
pub struct StateStore {
    pool: SqlitePool,
    // Serializes read-modify-write cycles across sections
    write_lock: Arc<Mutex<()>>,
}

impl StateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read a section's raw blob, if present.
    async fn get_section(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM app_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Rewrite a section's blob in full.
    async fn put_section(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Wrote state section: {}", key);
        Ok(())
    }

    /// Decode a section, resetting to the default when the blob is missing
    /// or does not deserialize. A bad blob never reaches the caller.
    async fn load_section<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self.get_section(key).await? {
            Some(raw) => raw,
            None => return Ok(T::default()),
        };

        match serde_json::from_str(&raw) {
            Ok(section) => Ok(section),
            Err(e) => {
                tracing::warn!("State section '{}' is corrupt, resetting to default: {}", key, e);
                Ok(T::default())
            }
        }
    }

    async fn save_section<T>(&self, key: &str, section: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(section)?;
        self.put_section(key, &raw).await
    }

    pub async fn load_medications(&self) -> Result<Vec<Medication>> {
        self.load_section(MEDICATIONS_KEY).await
    }

    pub async fn save_medications(&self, medications: &[Medication]) -> Result<()> {
        self.save_section(MEDICATIONS_KEY, medications).await
    }

    pub async fn load_hydration(&self) -> Result<HydrationState> {
        self.load_section(HYDRATION_KEY).await
    }

    pub async fn save_hydration(&self, state: &HydrationState) -> Result<()> {
        self.save_section(HYDRATION_KEY, state).await
    }

    pub async fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        self.load_section(HISTORY_KEY).await
    }

    pub async fn save_history(&self, history: &[HistoryEntry]) -> Result<()> {
        self.save_section(HISTORY_KEY, history).await
    }

    /// Apply a mutation to the medication list under the store lock and
    /// persist the result, returning the updated list.
    pub async fn update_medications<F>(&self, mutate: F) -> Result<Vec<Medication>>
    where
        F: FnOnce(&mut Vec<Medication>),
    {
        let _guard = self.write_lock.lock().await;

        let mut medications = self.load_medications().await?;
        mutate(&mut medications);
        self.save_medications(&medications).await?;

        Ok(medications)
    }

    /// Apply a mutation to the hydration state under the store lock and
    /// persist the result.
    pub async fn update_hydration<F>(&self, mutate: F) -> Result<HydrationState>
    where
        F: FnOnce(&mut HydrationState),
    {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load_hydration().await?;
        mutate(&mut state);
        self.save_hydration(&state).await?;

        Ok(state)
    }

    /// Apply a mutation to the history list under the store lock and
    /// persist the result.
    pub async fn update_history<F>(&self, mutate: F) -> Result<Vec<HistoryEntry>>
    where
        F: FnOnce(&mut Vec<HistoryEntry>),
    {
        let _guard = self.write_lock.lock().await;

        let mut history = self.load_history().await?;
        mutate(&mut history);
        self.save_history(&history).await?;

        Ok(history)
    }
}
