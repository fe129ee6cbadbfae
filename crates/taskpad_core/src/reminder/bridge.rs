use crate::model::note::Note;
use crate::model::timestamp::ReminderAt;
use crate::service::clock::Clock;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Fixed notification title for note reminders.
pub const REMINDER_TITLE: &str = "Reminder";

/// Notification permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            "undetermined" => Some(Self::Undetermined),
            _ => None,
        }
    }
}

/// Platform permission query/request contract.
pub trait NotificationPermissions: Send {
    fn status(&self) -> PermissionStatus;
    fn request(&mut self) -> PermissionStatus;
}

/// How a delivered reminder is presented while the app is in foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPresentation {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for NotificationPresentation {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

/// One-shot local notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub title: String,
    pub body: String,
    pub fire_at: ReminderAt,
    pub presentation: NotificationPresentation,
}

impl ReminderRequest {
    pub fn for_note(note: &Note) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: note.text.clone(),
            fire_at: note.reminder_at.clone(),
            presentation: NotificationPresentation::default(),
        }
    }
}

/// Opaque platform id of a scheduled notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(String);

impl ScheduleHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ScheduleHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scheduler-side failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    PermissionDenied,
    Scheduler(String),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Scheduler(message) => write!(f, "reminder scheduling failed: {message}"),
        }
    }
}

impl Error for ReminderError {}

/// Platform one-shot notification scheduler.
pub trait ReminderScheduler: Send {
    fn schedule(&mut self, request: &ReminderRequest) -> Result<ScheduleHandle, ReminderError>;
}

/// Result of trying to schedule a note's reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Scheduled(ScheduleHandle),
    SkippedPermission,
    SkippedPastDue,
    Failed(String),
}

/// Connects note creation to the platform notification services.
pub struct ReminderBridge {
    permissions: Box<dyn NotificationPermissions>,
    scheduler: Box<dyn ReminderScheduler>,
    clock: Arc<dyn Clock>,
    permission: Option<PermissionStatus>,
}

impl ReminderBridge {
    pub fn new(
        permissions: Box<dyn NotificationPermissions>,
        scheduler: Box<dyn ReminderScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            permissions,
            scheduler,
            clock,
            permission: None,
        }
    }

    /// Resolves notification permission, prompting only when undetermined.
    ///
    /// Later calls return the cached answer without prompting again.
    pub fn ensure_permission(&mut self) -> PermissionStatus {
        if let Some(status) = self.permission {
            return status;
        }

        let mut status = self.permissions.status();
        if status == PermissionStatus::Undetermined {
            status = self.permissions.request();
        }
        if status == PermissionStatus::Granted {
            info!("event=notification_permission module=reminder status=ok result=granted");
        } else {
            warn!(
                "event=notification_permission module=reminder status=degraded result={}",
                status.as_str()
            );
        }
        self.permission = Some(status);
        status
    }

    /// Records a permission change reported by the host after startup.
    pub fn set_permission(&mut self, status: PermissionStatus) {
        info!(
            "event=notification_permission module=reminder status=updated result={}",
            status.as_str()
        );
        self.permission = Some(status);
    }

    pub fn permission(&self) -> Option<PermissionStatus> {
        self.permission
    }

    /// Schedules the reminder for a just-created note.
    ///
    /// Never fails the caller; every non-scheduled path is logged.
    pub fn schedule_for(&mut self, note: &Note) -> ReminderOutcome {
        let permission = self
            .permission
            .unwrap_or_else(|| self.permissions.status());
        if permission != PermissionStatus::Granted {
            info!(
                "event=reminder_schedule module=reminder status=skip note_id={} reason=permission_{}",
                note.id,
                permission.as_str()
            );
            return ReminderOutcome::SkippedPermission;
        }

        let now_ms = self.clock.now().timestamp_millis();
        if note.reminder_at.epoch_millis() <= now_ms {
            info!(
                "event=reminder_schedule module=reminder status=skip note_id={} reason=past_due fire_at={}",
                note.id, note.reminder_at
            );
            return ReminderOutcome::SkippedPastDue;
        }

        let request = ReminderRequest::for_note(note);
        match self.scheduler.schedule(&request) {
            Ok(handle) => {
                info!(
                    "event=reminder_schedule module=reminder status=ok note_id={} handle={} fire_at={}",
                    note.id, handle, request.fire_at
                );
                ReminderOutcome::Scheduled(handle)
            }
            Err(ReminderError::PermissionDenied) => {
                warn!(
                    "event=reminder_schedule module=reminder status=skip note_id={} reason=permission_revoked",
                    note.id
                );
                self.permission = Some(PermissionStatus::Denied);
                ReminderOutcome::SkippedPermission
            }
            Err(err) => {
                error!(
                    "event=reminder_schedule module=reminder status=error note_id={} error={}",
                    note.id, err
                );
                ReminderOutcome::Failed(err.to_string())
            }
        }
    }
}
