//! Reminder scheduling bridge.
//!
//! # Responsibility
//! - Define the notification permission and one-shot scheduling contracts.
//! - Turn a freshly created note into a scheduling request.
//!
//! # Invariants
//! - Permission is asked for at most once per session.
//! - Reminder failures never fail note creation; they are logged only.
//! - Reminders whose instant is not in the future are skipped.

mod bridge;
mod host;

pub use bridge::{
    NotificationPermissions, NotificationPresentation, PermissionStatus, ReminderBridge,
    ReminderError, ReminderOutcome, ReminderRequest, ReminderScheduler, ScheduleHandle,
    REMINDER_TITLE,
};
pub use host::{HostPermissions, QueuedReminder, QueuedReminderScheduler};
