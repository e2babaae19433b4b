//! Persisted state models
//!
//! Serde structs for the three state sections: the medication list, the
//! hydration state, and the action history. Fields added after the first
//! release carry serde defaults so older blobs keep deserializing.

use crate::config::DEFAULT_HYDRATION_GOAL;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A medication with its daily dose schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    /// One day of dose times as HH:mm clock strings
    pub times: Vec<String>,
    /// The upcoming dose time as an HH:mm clock string
    pub next_dose: String,
    #[serde(default)]
    pub last_taken: Option<DateTime<Utc>>,
    pub frequency_hours: f32,
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
}

/// Daily water intake state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationState {
    #[serde(default)]
    pub last_drunk: Option<DateTime<Utc>>,
    /// Glasses drunk today
    #[serde(default)]
    pub daily_intake: u32,
    /// Daily goal in glasses
    #[serde(default = "default_hydration_goal")]
    pub goal: u32,
    /// Overrides the goal-derived reminder interval when set
    #[serde(default)]
    pub custom_frequency_hours: Option<f32>,
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
}

impl Default for HydrationState {
    fn default() -> Self {
        Self {
            last_drunk: None,
            daily_intake: 0,
            goal: default_hydration_goal(),
            custom_frequency_hours: None,
            reminders_enabled: true,
        }
    }
}

/// Which part of the tracker a history entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryCategory {
    Medication,
    Hydration,
}

/// A logged user action, newest first in the history section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub category: HistoryCategory,
    pub description: String,
    /// HH:mm clock string of when the action happened
    pub time: String,
}

/// Create medication request
#[derive(Debug, Deserialize)]
pub struct CreateMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency_hours: f32,
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
}

/// Update hydration settings request
#[derive(Debug, Deserialize)]
pub struct UpdateHydrationRequest {
    pub goal: u32,
    #[serde(default)]
    pub custom_frequency_hours: Option<f32>,
    pub reminders_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_hydration_goal() -> u32 {
    DEFAULT_HYDRATION_GOAL
}
