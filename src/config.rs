//! Engine tuning constants
//!
//! Every interval floor, validation bound, and retention limit the
//! engine uses lives here.

// ===== Dose Schedule =====

/// Minutes in one day of dose-schedule coverage
pub const MINUTES_PER_DAY: i64 = 1440;

/// Minimum spacing between generated dose times in minutes.
/// Sub-minute frequencies would produce a schedule with duplicate entries.
pub const MIN_DOSE_INTERVAL_MINUTES: i64 = 1;

/// Maximum medication/hydration frequency in hours (one week).
/// Anything sparser is better handled by re-adding the medication.
pub const MAX_FREQUENCY_HOURS: f32 = 168.0;

/// Clock string format used for dose times and history timestamps
pub const CLOCK_FORMAT: &str = "%H:%M";

// ===== Reminder Timers =====

/// Floor for the medication reminder interval in seconds.
/// A misconfigured frequency must not turn a timer into a busy loop.
pub const MIN_REMINDER_INTERVAL_SECS: u64 = 60;

/// Snooze length applied when the user does not pick one
pub const DEFAULT_SNOOZE_MINUTES: u32 = 15;

/// Maximum snooze length in minutes (4 hours).
/// Beyond this the next scheduled reminder covers it.
pub const MAX_SNOOZE_MINUTES: u32 = 240;

// ===== Hydration Settings Limits =====

/// Default daily hydration goal in glasses
pub const DEFAULT_HYDRATION_GOAL: u32 = 8;

/// Minimum daily hydration goal in glasses
pub const MIN_HYDRATION_GOAL: u32 = 1;

/// Maximum daily hydration goal in glasses (10 litres)
pub const MAX_HYDRATION_GOAL: u32 = 40;

/// Volume of one hydration unit in litres
pub const GLASS_VOLUME_LITERS: f32 = 0.25;

/// Waking minutes the goal is spread over when no custom reminder
/// frequency is set (16 hours)
pub const WAKING_MINUTES_PER_DAY: f32 = 960.0;

// ===== History =====

/// Maximum retained history entries.
/// The history section is rewritten whole on every action, so the
/// list must stay bounded.
pub const MAX_HISTORY_ENTRIES: usize = 100;

// ===== Events =====

/// Capacity of the notification broadcast channel.
/// Slow subscribers past this many buffered events start lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// ===== Rollover =====

/// Cron expression for the daily rollover job (local midnight)
pub const ROLLOVER_CRON: &str = "0 0 0 * * *";
