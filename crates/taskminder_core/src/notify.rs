//! Reminder delivery seams.
//!
//! # Responsibility
//! - Build the user-facing reminder payload for a task.
//! - Define the platform notification and sound/vibration contracts.
//!
//! # Invariants
//! - Sinks are best-effort; their failures never abort a scheduler tick.

use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Reminder payload handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: format!("Deadline: {}", task.title),
            body: format!(
                "Time to finish your {} task ({} priority)",
                task.category, task.priority
            ),
        }
    }
}

/// Failure reported by a best-effort sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(pub String);

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink failed: {}", self.0)
    }
}

impl Error for SinkError {}

/// Platform notification channel.
pub trait NotificationSink {
    fn permission(&self) -> Permission;

    /// Prompts for permission; returns the resulting state.
    fn request_permission(&mut self) -> Permission;

    fn deliver(&mut self, notification: &Notification) -> Result<(), SinkError>;
}

/// Sound and vibration side effects.
pub trait AlertSink {
    fn play_sound(&mut self) -> Result<(), SinkError>;
    fn vibrate(&mut self) -> Result<(), SinkError>;
}

/// Alert sink for environments without audio or haptics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlerts;

impl AlertSink for SilentAlerts {
    fn play_sound(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn vibrate(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Notification;
    use crate::model::task::{parse_deadline, Priority, TaskDraft};

    #[test]
    fn notification_names_title_category_and_priority() {
        let mut draft = TaskDraft::new("Pay bill", parse_deadline("2024-01-01T10:00").unwrap());
        draft.category = Some("Finance".to_string());
        draft.priority = Some(Priority::Urgent);
        let task = draft.into_task(1).unwrap();

        let notification = Notification::for_task(&task);
        assert_eq!(notification.title, "Deadline: Pay bill");
        assert!(notification.body.contains("Finance"));
        assert!(notification.body.contains("Urgent"));
    }
}
