//! Host-driven implementations of the reminder contracts.
//!
//! The UI shell owns the real notification APIs. These adapters let core
//! decide *what* to schedule while the shell drains and executes requests.

use crate::reminder::bridge::{
    NotificationPermissions, PermissionStatus, ReminderError, ReminderRequest, ReminderScheduler,
    ScheduleHandle,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Permission state mirrored from the host.
///
/// `request` cannot show a dialog itself; it reports whatever the host last
/// published, so an unanswered prompt stays `Undetermined`.
#[derive(Debug, Clone)]
pub struct HostPermissions {
    status: Arc<Mutex<PermissionStatus>>,
}

impl HostPermissions {
    pub fn new(initial: PermissionStatus) -> Self {
        Self {
            status: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn publish(&self, status: PermissionStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }
}

impl NotificationPermissions for HostPermissions {
    fn status(&self) -> PermissionStatus {
        self.status
            .lock()
            .map(|status| *status)
            .unwrap_or(PermissionStatus::Undetermined)
    }

    fn request(&mut self) -> PermissionStatus {
        self.status()
    }
}

/// Scheduling request waiting for the host to deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedReminder {
    pub handle: ScheduleHandle,
    pub request: ReminderRequest,
}

/// Scheduler that queues requests for the host shell.
///
/// Clones share one queue.
#[derive(Debug, Clone, Default)]
pub struct QueuedReminderScheduler {
    pending: Arc<Mutex<Vec<QueuedReminder>>>,
}

impl QueuedReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued request in scheduling order.
    pub fn take_pending(&self) -> Vec<QueuedReminder> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }
}

impl ReminderScheduler for QueuedReminderScheduler {
    fn schedule(&mut self, request: &ReminderRequest) -> Result<ScheduleHandle, ReminderError> {
        let handle = ScheduleHandle::new(Uuid::new_v4().to_string());
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| ReminderError::Scheduler("reminder queue poisoned".to_string()))?;
        pending.push(QueuedReminder {
            handle: handle.clone(),
            request: request.clone(),
        });
        Ok(handle)
    }
}
