//! Hydration tracking
//!
//! Water intake counting against a daily glass goal, hydration reminder
//! settings, and the progress read-out shown on the status surface.

use crate::config::{
    DEFAULT_SNOOZE_MINUTES, GLASS_VOLUME_LITERS, MAX_FREQUENCY_HOURS, MAX_HYDRATION_GOAL,
    MAX_SNOOZE_MINUTES, MIN_HYDRATION_GOAL,
};
use crate::database::{HistoryCategory, HydrationState, StateStore, UpdateHydrationRequest};
use crate::dose::StatusColor;
use crate::error::{AppError, Result};
use crate::services::history::HistoryService;
use crate::services::notifications::NotificationsService;
use crate::services::reminders::{ReminderKey, RemindersService};
use chrono::Utc;

/// Hydration status tier derived from progress against the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationTier {
    GoalReached,
    WellHydrated,
    GoodProgress,
    KeepDrinking,
    NeedsMoreWater,
}

impl HydrationTier {
    pub fn label(self) -> &'static str {
        match self {
            HydrationTier::GoalReached => "Goal reached",
            HydrationTier::WellHydrated => "Well hydrated",
            HydrationTier::GoodProgress => "Good progress",
            HydrationTier::KeepDrinking => "Keep drinking",
            HydrationTier::NeedsMoreWater => "Needs more water",
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            HydrationTier::GoalReached => StatusColor::Green,
            HydrationTier::WellHydrated => StatusColor::Blue,
            HydrationTier::GoodProgress => StatusColor::Amber,
            HydrationTier::KeepDrinking => StatusColor::Orange,
            HydrationTier::NeedsMoreWater => StatusColor::Red,
        }
    }
}

/// Progress snapshot for the hydration goal
#[derive(Debug, Clone, serde::Serialize)]
pub struct HydrationProgress {
    pub intake: u32,
    pub goal: u32,
    pub fraction: f32,
    /// Litres drunk against the goal, e.g. "1.0/2.0L"
    pub display: String,
    pub tier: HydrationTier,
    pub label: String,
    pub color: StatusColor,
}

/// Classify intake against the goal.
pub fn hydration_status(intake: u32, goal: u32) -> HydrationTier {
    let fraction = goal_fraction(intake, goal);

    if fraction >= 1.0 {
        HydrationTier::GoalReached
    } else if fraction >= 0.75 {
        HydrationTier::WellHydrated
    } else if fraction >= 0.5 {
        HydrationTier::GoodProgress
    } else if fraction >= 0.25 {
        HydrationTier::KeepDrinking
    } else {
        HydrationTier::NeedsMoreWater
    }
}

fn goal_fraction(intake: u32, goal: u32) -> f32 {
    if goal == 0 {
        return 1.0;
    }
    intake as f32 / goal as f32
}

/// Service for hydration tracking
#[derive(Clone)]
pub struct HydrationService {
    store: StateStore,
    history: HistoryService,
    notifications: NotificationsService,
    reminders: RemindersService,
}

impl HydrationService {
    pub fn new(
        store: StateStore,
        history: HistoryService,
        notifications: NotificationsService,
        reminders: RemindersService,
    ) -> Self {
        Self {
            store,
            history,
            notifications,
            reminders,
        }
    }

    /// Current hydration state.
    pub async fn state(&self) -> Result<HydrationState> {
        self.store.load_hydration().await
    }

    /// Record one glass drunk. The running timer re-reads state on its next
    /// tick, so reaching the goal retires it without an explicit cancel.
    pub async fn drink_water(&self) -> Result<HydrationState> {
        let now = Utc::now();

        let state = self
            .store
            .update_hydration(|state| {
                state.last_drunk = Some(now);
                state.daily_intake += 1;
            })
            .await?;

        let millilitres = (GLASS_VOLUME_LITERS * 1000.0) as u32;
        self.history
            .record(
                HistoryCategory::Hydration,
                &format!("{} ml of water", millilitres),
            )
            .await?;
        self.notifications.dismiss().await;

        tracing::info!(
            "Water intake recorded: {}/{} glasses",
            state.daily_intake,
            state.goal
        );

        Ok(state)
    }

    /// Snooze the active hydration reminder and clear the notification.
    /// Falls back to the default snooze length.
    pub async fn snooze(&self, minutes: Option<u32>) -> Result<()> {
        let minutes = minutes.unwrap_or(DEFAULT_SNOOZE_MINUTES);

        if minutes == 0 || minutes > MAX_SNOOZE_MINUTES {
            return Err(AppError::InvalidRequest(format!(
                "Snooze must be between 1 and {} minutes",
                MAX_SNOOZE_MINUTES
            )));
        }

        self.reminders
            .schedule_snooze(ReminderKey::Hydration, minutes)
            .await;
        self.notifications.dismiss().await;

        tracing::info!("Hydration reminder snoozed for {} minutes", minutes);
        Ok(())
    }

    /// Update goal and reminder settings, re-arming or cancelling the
    /// hydration timer to match.
    pub async fn update_settings(&self, req: UpdateHydrationRequest) -> Result<HydrationState> {
        if req.goal < MIN_HYDRATION_GOAL || req.goal > MAX_HYDRATION_GOAL {
            return Err(AppError::InvalidRequest(format!(
                "Daily goal must be between {} and {} glasses",
                MIN_HYDRATION_GOAL, MAX_HYDRATION_GOAL
            )));
        }

        if let Some(hours) = req.custom_frequency_hours {
            if hours <= 0.0 || hours > MAX_FREQUENCY_HOURS {
                return Err(AppError::InvalidRequest(format!(
                    "Reminder frequency must be between 0 and {} hours",
                    MAX_FREQUENCY_HOURS
                )));
            }
        }

        let state = self
            .store
            .update_hydration(|state| {
                state.goal = req.goal;
                state.custom_frequency_hours = req.custom_frequency_hours;
                state.reminders_enabled = req.reminders_enabled;
            })
            .await?;

        if state.reminders_enabled && state.daily_intake < state.goal {
            self.reminders.schedule_hydration(&state).await;
        } else {
            self.reminders.cancel(&ReminderKey::Hydration).await;
        }

        tracing::info!("Hydration settings updated: goal {} glasses", state.goal);
        Ok(state)
    }

    /// Current progress against the daily goal.
    pub async fn progress(&self) -> Result<HydrationProgress> {
        let state = self.state().await?;
        Ok(Self::progress_for(&state))
    }

    fn progress_for(state: &HydrationState) -> HydrationProgress {
        let tier = hydration_status(state.daily_intake, state.goal);
        let litres_drunk = state.daily_intake as f32 * GLASS_VOLUME_LITERS;
        let litres_goal = state.goal as f32 * GLASS_VOLUME_LITERS;

        HydrationProgress {
            intake: state.daily_intake,
            goal: state.goal,
            fraction: goal_fraction(state.daily_intake, state.goal),
            display: format!("{:.1}/{:.1}L", litres_drunk, litres_goal),
            tier,
            label: tier.label().to_string(),
            color: tier.color(),
        }
    }

    /// Start a fresh hydration day: zero the intake and re-arm reminders.
    /// Run by the daily rollover job at midnight.
    pub async fn reset_daily(&self) -> Result<HydrationState> {
        let state = self
            .store
            .update_hydration(|state| {
                state.daily_intake = 0;
            })
            .await?;

        if state.reminders_enabled {
            self.reminders.schedule_hydration(&state).await;
        }

        tracing::info!("Hydration intake reset for a new day");
        Ok(state)
    }
}
