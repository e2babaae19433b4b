//! Error types for the medwatch engine
//!
//! One error enum for the whole crate, with conversions from the
//! underlying database, IO, and serialization errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Medication not found: {0}")]
    MedicationNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
