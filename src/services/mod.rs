//! Business logic services
//!
//! Each service owns one slice of behavior and coordinates between the
//! daemon surface and the state store.

pub mod history;
pub mod hydration;
pub mod medications;
pub mod notifications;
pub mod reminders;
pub mod scheduler;

pub use history::HistoryService;
pub use hydration::HydrationService;
pub use medications::MedicationsService;
pub use notifications::NotificationsService;
pub use reminders::RemindersService;
pub use scheduler::SchedulerService;
