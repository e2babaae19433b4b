//! medwatch library
//!
//! Core engine of the medication and hydration reminder daemon: state
//! store, dose scheduling, reminder timers, and notification dispatch.

pub mod app;
pub mod config;
pub mod database;
pub mod dose;
pub mod error;
pub mod services;
