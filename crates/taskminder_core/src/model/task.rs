//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its closed enumerations and creation input.
//! - Provide lifecycle helpers that enforce one-way transitions.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `status` only transitions `Active -> Completed`.
//! - `notified` only transitions `false -> true`.
//! - `completed_at` is set exactly when `status` becomes `Completed`.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier derived from creation time (epoch milliseconds).
pub type TaskId = i64;

/// Category assigned when the caller leaves it blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Urgency level. Declaration order is ascending, so `Urgent` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(alias = "Biasa", alias = "normal")]
    Normal,
    #[serde(alias = "Penting", alias = "important")]
    Important,
    #[serde(alias = "urgent")]
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Important => "Important",
            Self::Normal => "Normal",
        }
    }

    /// Parses user input case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "urgent" => Some(Self::Urgent),
            "important" | "penting" => Some(Self::Important),
            "normal" | "biasa" => Some(Self::Normal),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Recurrence cadence applied when a task is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Once,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Some(Self::Once),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Returns the offset to the next occurrence, or `None` for one-shot tasks.
    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::Once => None,
            Self::Daily => Some(Duration::days(1)),
            Self::Weekly => Some(Duration::days(7)),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Task lifecycle state. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Completed,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Serialized as `desc` to stay compatible with existing saved data.
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(deserialize_with = "deserialize_deadline")]
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
    pub status: TaskStatus,
    #[serde(default)]
    pub notified: bool,
    /// Unparseable legacy values (locale-formatted strings) read as `None`;
    /// the store backfills them with `backfill_completed_at`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_completed_at"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_deadline(&raw).ok_or_else(|| D::Error::custom(format!("invalid deadline `{raw}`")))
}

fn deserialize_completed_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_deadline))
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether the reminder for this task is due at `now`.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && !self.notified && self.deadline <= now
    }

    /// Marks the task completed at `at`.
    ///
    /// Returns `false` without touching the record when already completed.
    pub fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
        true
    }

    /// Gives completed records without a readable completion time the
    /// deadline as their completion time.
    pub fn backfill_completed_at(&mut self) {
        if self.is_completed() && self.completed_at.is_none() {
            self.completed_at = Some(self.deadline);
        }
    }

    /// Sets the one-way reminder flag.
    pub fn mark_notified(&mut self) {
        self.notified = true;
    }

    /// Builds the next occurrence for recurring tasks.
    ///
    /// The next deadline is derived from this task's deadline, not from the
    /// completion time, so the cadence does not drift.
    pub fn successor(&self, id: TaskId) -> Option<Task> {
        let interval = self.frequency.interval()?;
        Some(Task {
            id,
            deadline: self.deadline + interval,
            status: TaskStatus::Active,
            notified: false,
            completed_at: None,
            ..self.clone()
        })
    }
}

/// Caller-provided fields for task creation. Unset fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub frequency: Option<Frequency>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.deadline.is_none() {
            return Err(TaskValidationError::MissingDeadline);
        }
        Ok(())
    }

    /// Converts a validated draft into an active task.
    pub fn into_task(self, id: TaskId) -> Result<Task, TaskValidationError> {
        self.validate()?;
        let deadline = self.deadline.ok_or(TaskValidationError::MissingDeadline)?;
        let category = self
            .category
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(default_category);

        Ok(Task {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            category,
            priority: self.priority.unwrap_or_default(),
            deadline,
            frequency: self.frequency.unwrap_or_default(),
            status: TaskStatus::Active,
            notified: false,
            completed_at: None,
        })
    }
}

/// Validation failures for task creation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    MissingDeadline,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::MissingDeadline => write!(f, "task deadline is required"),
        }
    }
}

impl Error for TaskValidationError {}

/// Parses a deadline as entered by users.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`) and the local-input forms
/// `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM[:SS]`, which are read as UTC.
pub fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> DateTime<Utc> {
        parse_deadline(value).expect("valid test deadline")
    }

    #[test]
    fn priority_order_is_urgent_important_normal() {
        assert!(Priority::Urgent > Priority::Important);
        assert!(Priority::Important > Priority::Normal);
    }

    #[test]
    fn parse_deadline_accepts_local_input_and_rfc3339() {
        assert_eq!(at("2024-01-01T10:00"), at("2024-01-01T10:00:00Z"));
        assert_eq!(at("2024-01-01 10:00:30"), at("2024-01-01T10:00:30+00:00"));
        assert!(parse_deadline("tomorrow").is_none());
    }

    #[test]
    fn draft_applies_defaults() {
        let task = TaskDraft::new("  Pay bill ", at("2024-01-01T10:00"))
            .into_task(7)
            .unwrap();
        assert_eq!(task.title, "Pay bill");
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert_eq!(task.priority, Priority::Normal);
        assert_eq!(task.frequency, Frequency::Once);
        assert_eq!(task.status, TaskStatus::Active);
        assert!(!task.notified);
    }

    #[test]
    fn draft_rejects_blank_title_and_missing_deadline() {
        let blank = TaskDraft::new("   ", at("2024-01-01T10:00"));
        assert_eq!(blank.validate(), Err(TaskValidationError::EmptyTitle));

        let undated = TaskDraft {
            title: "Call".to_string(),
            ..TaskDraft::default()
        };
        assert_eq!(undated.validate(), Err(TaskValidationError::MissingDeadline));
    }

    #[test]
    fn complete_is_one_way() {
        let mut task = TaskDraft::new("Once", at("2024-01-01T10:00"))
            .into_task(1)
            .unwrap();
        assert!(task.complete(at("2024-01-01T11:00")));
        assert!(!task.complete(at("2024-01-02T11:00")));
        assert_eq!(task.completed_at, Some(at("2024-01-01T11:00")));
    }

    #[test]
    fn backfill_keeps_active_and_timestamped_records() {
        let mut active = TaskDraft::new("Open", at("2024-01-01T10:00"))
            .into_task(1)
            .unwrap();
        active.backfill_completed_at();
        assert_eq!(active.completed_at, None);

        active.complete(at("2024-01-01T12:00"));
        active.backfill_completed_at();
        assert_eq!(active.completed_at, Some(at("2024-01-01T12:00")));
    }

    #[test]
    fn successor_advances_from_original_deadline() {
        let mut draft = TaskDraft::new("Standup", at("2024-01-01T09:00"));
        draft.frequency = Some(Frequency::Weekly);
        let mut task = draft.into_task(1).unwrap();
        task.mark_notified();
        task.complete(at("2024-01-05T12:00"));

        let next = task.successor(2).expect("weekly task recurs");
        assert_eq!(next.id, 2);
        assert_eq!(next.deadline, at("2024-01-08T09:00"));
        assert_eq!(next.status, TaskStatus::Active);
        assert!(!next.notified);
        assert_eq!(next.completed_at, None);
        assert_eq!(next.title, task.title);
    }

    #[test]
    fn deserializes_legacy_records() {
        let json = r#"{
            "id": 1700000000000,
            "title": "Lapor",
            "desc": "",
            "category": "Kerja",
            "priority": "Penting",
            "deadline": "2024-01-01T10:00",
            "frequency": "daily",
            "status": "completed",
            "completedAt": "1/1/2024, 10.30.00"
        }"#;
        let mut task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.deadline, at("2024-01-01T10:00"));
        assert_eq!(task.completed_at, None);
        task.backfill_completed_at();
        assert_eq!(task.completed_at, Some(at("2024-01-01T10:00")));
        assert_eq!(task.priority, Priority::Important);
        assert_eq!(task.frequency, Frequency::Daily);
        assert!(!task.notified);
    }
}
