//! Notification dispatch
//!
//! Builds reminder notifications, tracks the single active one, and fans
//! each event out to subscribers over a broadcast channel. Responding to
//! a notification in any way clears the active slot.

use crate::config::EVENT_CHANNEL_CAPACITY;
use crate::database::Medication;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Kind of reminder a notification carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Medication,
    Hydration,
}

/// A reminder notification surfaced to the user
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Set for medication reminders so a response can address the entity
    pub medication_id: Option<String>,
}

/// Service owning the active notification slot and the event stream
#[derive(Clone)]
pub struct NotificationsService {
    active: Arc<RwLock<Option<Notification>>>,
    events: broadcast::Sender<Notification>,
}

impl NotificationsService {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            active: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Raise a medication reminder, replacing any active notification.
    pub async fn notify_medication(&self, medication: &Medication) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: NotificationKind::Medication,
            title: "Medication time".to_string(),
            body: format!("Time to take {} {}", medication.name, medication.dosage),
            medication_id: Some(medication.id.clone()),
        };

        self.publish(notification).await
    }

    /// Raise a hydration reminder, replacing any active notification.
    pub async fn notify_hydration(&self) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind: NotificationKind::Hydration,
            title: "Time to drink water!".to_string(),
            body: "Have a glass to stay hydrated".to_string(),
            medication_id: None,
        };

        self.publish(notification).await
    }

    async fn publish(&self, notification: Notification) -> Notification {
        {
            let mut active = self.active.write().await;
            *active = Some(notification.clone());
        }

        // A send error only means nobody is subscribed right now
        let _ = self.events.send(notification.clone());

        tracing::info!(
            "Notification raised: {} - {}",
            notification.title,
            notification.body
        );

        notification
    }

    /// The currently surfaced notification, if any.
    pub async fn active(&self) -> Option<Notification> {
        self.active.read().await.clone()
    }

    /// Clear the active notification. Safe to call when nothing is active.
    pub async fn dismiss(&self) {
        let mut active = self.active.write().await;

        if active.take().is_some() {
            tracing::debug!("Notification dismissed");
        }
    }

    /// Subscribe to the notification event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }
}

impl Default for NotificationsService {
    fn default() -> Self {
        Self::new()
    }
}
