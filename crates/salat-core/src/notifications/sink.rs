use serde::{Deserialize, Serialize};

use super::scheduler::ScheduledNotification;
use crate::error::NotificationError;

/// Platform permission to present notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Undetermined,
}

/// Platform notification presentation.
pub trait NotificationSink {
    fn permission(&self) -> Permission;

    /// Ask the platform for permission. Returns the resulting state.
    fn request_permission(&mut self) -> Permission;

    /// Present one reminder to the user.
    fn present(&mut self, notification: &ScheduledNotification) -> Result<(), NotificationError>;
}

/// Sink that records presentations, with switchable failure.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RecordingSink {
    pub permission: Permission,
    pub grant_on_request: bool,
    pub fail: bool,
    pub presented: Vec<String>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn granted() -> Self {
        Self {
            permission: Permission::Granted,
            grant_on_request: true,
            fail: false,
            presented: Vec::new(),
        }
    }
}

#[cfg(test)]
impl NotificationSink for RecordingSink {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.grant_on_request {
            self.permission = Permission::Granted;
        } else {
            self.permission = Permission::Denied;
        }
        self.permission
    }

    fn present(&mut self, notification: &ScheduledNotification) -> Result<(), NotificationError> {
        if self.permission != Permission::Granted {
            return Err(NotificationError::PermissionDenied);
        }
        if self.fail {
            return Err(NotificationError::PresentationFailed {
                id: notification.id.clone(),
                message: "platform unavailable".into(),
            });
        }
        self.presented.push(notification.id.clone());
        Ok(())
    }
}
