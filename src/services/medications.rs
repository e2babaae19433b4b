//! Medication operations
//!
//! Business logic for the medication list: creating and removing
//! medications, recording dose responses, and keeping reminder timers in
//! sync with every change.

use crate::config::{DEFAULT_SNOOZE_MINUTES, MAX_FREQUENCY_HOURS, MAX_SNOOZE_MINUTES};
use crate::database::{CreateMedicationRequest, HistoryCategory, Medication, StateStore};
use crate::dose;
use crate::error::{AppError, Result};
use crate::services::history::HistoryService;
use crate::services::notifications::NotificationsService;
use crate::services::reminders::{ReminderKey, RemindersService};
use chrono::{Local, Utc};
use uuid::Uuid;

/// Service for managing medications
#[derive(Clone)]
pub struct MedicationsService {
    store: StateStore,
    history: HistoryService,
    notifications: NotificationsService,
    reminders: RemindersService,
}

impl MedicationsService {
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

    /// Add a medication and arm its reminder timer. Dose times are spread
    /// over the day starting from the current clock time.
    pub async fn add_medication(&self, req: CreateMedicationRequest) -> Result<Medication> {
        let name = req.name.trim();
        let dosage = req.dosage.trim();

        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "Medication name cannot be empty".to_string(),
            ));
        }
        if dosage.is_empty() {
            return Err(AppError::InvalidRequest(
                "Medication dosage cannot be empty".to_string(),
            ));
        }
        if req.frequency_hours <= 0.0 || req.frequency_hours > MAX_FREQUENCY_HOURS {
            return Err(AppError::InvalidRequest(format!(
                "Frequency must be between 0 and {} hours",
                MAX_FREQUENCY_HOURS
            )));
        }

        let times = dose::generate_dose_times(Local::now().time(), req.frequency_hours);
        let next_dose = times.first().cloned().unwrap_or_default();

        let medication = Medication {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            dosage: dosage.to_string(),
            times,
            next_dose,
            last_taken: None,
            frequency_hours: req.frequency_hours,
            reminders_enabled: req.reminders_enabled,
        };

        tracing::info!("Adding medication: {} {}", medication.name, medication.dosage);

        let stored = medication.clone();
        self.store
            .update_medications(move |medications| medications.push(medication))
            .await?;

        self.reminders.schedule_medication(&stored).await;

        Ok(stored)
    }

    /// Get one medication by id.
    pub async fn get_medication(&self, id: &str) -> Result<Medication> {
        let medications = self.store.load_medications().await?;

        medications
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::MedicationNotFound(id.to_string()))
    }

    /// List all medications.
    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        self.store.load_medications().await
    }

    /// Enable or disable reminders, arming or cancelling the timer to match.
    pub async fn set_reminders_enabled(&self, id: &str, enabled: bool) -> Result<Medication> {
        let medications = self
            .store
            .update_medications(|medications| {
                if let Some(medication) = medications.iter_mut().find(|m| m.id == id) {
                    medication.reminders_enabled = enabled;
                }
            })
            .await?;

        let medication = medications
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::MedicationNotFound(id.to_string()))?;

        if enabled {
            self.reminders.schedule_medication(&medication).await;
        } else {
            self.reminders
                .cancel(&ReminderKey::Medication(id.to_string()))
                .await;
        }

        tracing::info!(
            "Reminders {} for {}",
            if enabled { "enabled" } else { "disabled" },
            medication.name
        );

        Ok(medication)
    }

    /// Remove a medication entirely, cancelling its timers.
    pub async fn remove_medication(&self, id: &str) -> Result<()> {
        let medication = self.get_medication(id).await?;

        self.store
            .update_medications(|medications| medications.retain(|m| m.id != id))
            .await?;

        self.reminders
            .cancel(&ReminderKey::Medication(id.to_string()))
            .await;

        tracing::info!("Removed medication: {}", medication.name);
        Ok(())
    }

    /// Record a dose as taken: stamps `last_taken`, advances the next dose,
    /// logs history, and clears the active notification.
    pub async fn take_medication(&self, id: &str) -> Result<Medication> {
        let now = Utc::now();

        let medications = self
            .store
            .update_medications(|medications| {
                if let Some(medication) = medications.iter_mut().find(|m| m.id == id) {
                    medication.last_taken = Some(now);
                    if let Some(next) =
                        dose::next_dose_after(&medication.times, Local::now().time())
                    {
                        medication.next_dose = next;
                    }
                }
            })
            .await?;

        let medication = medications
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::MedicationNotFound(id.to_string()))?;

        self.history
            .record(
                HistoryCategory::Medication,
                &format!("{} {} taken", medication.name, medication.dosage),
            )
            .await?;
        self.notifications.dismiss().await;

        tracing::info!("Dose taken: {} {}", medication.name, medication.dosage);
        Ok(medication)
    }

    /// Record a dose as skipped: advances the next dose without touching
    /// `last_taken`.
    pub async fn skip_medication(&self, id: &str) -> Result<Medication> {
        let medications = self
            .store
            .update_medications(|medications| {
                if let Some(medication) = medications.iter_mut().find(|m| m.id == id) {
                    if let Some(next) =
                        dose::next_dose_after(&medication.times, Local::now().time())
                    {
                        medication.next_dose = next;
                    }
                }
            })
            .await?;

        let medication = medications
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::MedicationNotFound(id.to_string()))?;

        self.history
            .record(
                HistoryCategory::Medication,
                &format!("{} {} skipped", medication.name, medication.dosage),
            )
            .await?;
        self.notifications.dismiss().await;

        tracing::info!("Dose skipped: {} {}", medication.name, medication.dosage);
        Ok(medication)
    }

    /// Snooze the active reminder for a medication and clear the
    /// notification. Falls back to the default snooze length.
    pub async fn snooze_medication(&self, id: &str, minutes: Option<u32>) -> Result<()> {
        let minutes = minutes.unwrap_or(DEFAULT_SNOOZE_MINUTES);

        if minutes == 0 || minutes > MAX_SNOOZE_MINUTES {
            return Err(AppError::InvalidRequest(format!(
                "Snooze must be between 1 and {} minutes",
                MAX_SNOOZE_MINUTES
            )));
        }

        let medication = self.get_medication(id).await?;

        self.reminders
            .schedule_snooze(ReminderKey::Medication(medication.id.clone()), minutes)
            .await;
        self.notifications.dismiss().await;

        tracing::info!("Snoozed {} for {} minutes", medication.name, minutes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> (MedicationsService, RemindersService, NotificationsService)
    {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let store = StateStore::new(pool);
        let notifications = NotificationsService::new();
        let history = HistoryService::new(store.clone());
        let reminders = RemindersService::new(store.clone(), notifications.clone());
        let service = MedicationsService::new(
            store,
            history,
            notifications.clone(),
            reminders.clone(),
        );

        (service, reminders, notifications)
    }

    fn create_request(name: &str, frequency_hours: f32) -> CreateMedicationRequest {
        CreateMedicationRequest {
            name: name.to_string(),
            dosage: "100mg".to_string(),
            frequency_hours,
            reminders_enabled: true,
        }
    }

    #[tokio::test]
    async fn test_add_medication_generates_schedule() {
        let (service, reminders, _notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 6.0))
            .await
            .unwrap();

        assert_eq!(medication.times.len(), 4);
        assert_eq!(medication.next_dose, medication.times[0]);
        assert!(medication.last_taken.is_none());
        assert!(
            reminders
                .is_scheduled(&ReminderKey::Medication(medication.id.clone()))
                .await
        );

        let listed = service.list_medications().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, medication.id);
    }

    #[tokio::test]
    async fn test_add_medication_validation() {
        let (service, _reminders, _notifications) = create_test_service().await;

        let empty_name = service.add_medication(create_request("  ", 8.0)).await;
        assert!(matches!(empty_name, Err(AppError::InvalidRequest(_))));

        let empty_dosage = service
            .add_medication(CreateMedicationRequest {
                name: "Aspirin".to_string(),
                dosage: " ".to_string(),
                frequency_hours: 8.0,
                reminders_enabled: true,
            })
            .await;
        assert!(matches!(empty_dosage, Err(AppError::InvalidRequest(_))));

        let zero_frequency = service.add_medication(create_request("Aspirin", 0.0)).await;
        assert!(matches!(zero_frequency, Err(AppError::InvalidRequest(_))));

        let huge_frequency = service
            .add_medication(create_request("Aspirin", 1000.0))
            .await;
        assert!(matches!(huge_frequency, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_take_medication_records_dose() {
        let (service, _reminders, notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 24.0))
            .await
            .unwrap();

        let taken = service.take_medication(&medication.id).await.unwrap();
        assert!(taken.last_taken.is_some());

        // The single daily dose wraps back onto itself
        assert_eq!(taken.next_dose, medication.times[0]);

        assert!(notifications.active().await.is_none());
    }

    #[tokio::test]
    async fn test_skip_medication_leaves_last_taken() {
        let (service, _reminders, _notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 12.0))
            .await
            .unwrap();

        let skipped = service.skip_medication(&medication.id).await.unwrap();
        assert!(skipped.last_taken.is_none());
    }

    #[tokio::test]
    async fn test_take_missing_medication_errors() {
        let (service, _reminders, _notifications) = create_test_service().await;

        let result = service.take_medication("ghost").await;
        assert!(matches!(result, Err(AppError::MedicationNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_medication_cancels_timer() {
        let (service, reminders, _notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 8.0))
            .await
            .unwrap();
        let key = ReminderKey::Medication(medication.id.clone());

        assert!(reminders.is_scheduled(&key).await);

        service.remove_medication(&medication.id).await.unwrap();

        assert!(!reminders.is_scheduled(&key).await);
        assert!(matches!(
            service.get_medication(&medication.id).await,
            Err(AppError::MedicationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_reminders_enabled_toggles_timer() {
        let (service, reminders, _notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 8.0))
            .await
            .unwrap();
        let key = ReminderKey::Medication(medication.id.clone());

        let disabled = service
            .set_reminders_enabled(&medication.id, false)
            .await
            .unwrap();
        assert!(!disabled.reminders_enabled);
        assert!(!reminders.is_scheduled(&key).await);

        let enabled = service
            .set_reminders_enabled(&medication.id, true)
            .await
            .unwrap();
        assert!(enabled.reminders_enabled);
        assert!(reminders.is_scheduled(&key).await);
    }

    #[tokio::test]
    async fn test_snooze_validation() {
        let (service, _reminders, _notifications) = create_test_service().await;

        let medication = service
            .add_medication(create_request("Aspirin", 8.0))
            .await
            .unwrap();

        let zero = service.snooze_medication(&medication.id, Some(0)).await;
        assert!(matches!(zero, Err(AppError::InvalidRequest(_))));

        let too_long = service
            .snooze_medication(&medication.id, Some(MAX_SNOOZE_MINUTES + 1))
            .await;
        assert!(matches!(too_long, Err(AppError::InvalidRequest(_))));

        let missing = service.snooze_medication("ghost", None).await;
        assert!(matches!(missing, Err(AppError::MedicationNotFound(_))));

        service
            .snooze_medication(&medication.id, None)
            .await
            .unwrap();
    }
}
