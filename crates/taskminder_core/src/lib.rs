//! Core domain logic for Taskminder.
//! This crate is the single source of truth for task lifecycle invariants.

pub mod clock;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod notify;
pub mod ordering;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use export::ics::{export_file_name, export_ics, ics_priority};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::settings::{Settings, Theme};
pub use model::task::{
    parse_deadline, Frequency, Priority, Task, TaskDraft, TaskId, TaskStatus,
    TaskValidationError, DEFAULT_CATEGORY,
};
pub use notify::{AlertSink, Notification, NotificationSink, Permission, SilentAlerts, SinkError};
pub use ordering::{is_overdue, order_active, order_history};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::settings_store::{load_settings, save_settings};
pub use repo::task_store::TaskStore;
pub use service::reminder_service::{
    PollingLoop, ReminderScheduler, TickReport, DEFAULT_POLL_INTERVAL,
};
pub use service::task_service::{CompletionResult, TaskError, TaskResult, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
