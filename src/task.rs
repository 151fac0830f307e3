//! Task records and the input shapes used to create and edit them.
//!
//! The serialized form keeps the camelCase keys of the browser app's
//! `localStorage` blob so existing exports load unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority '{other}' (expected low|medium|high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown status '{other}' (expected pending|completed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Overdue means dated, strictly before `today`, and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < today)
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("task id cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Validation(format!(
                "task {} has an empty title",
                self.id
            )));
        }
        if self.created_at > self.updated_at {
            return Err(Error::Validation(format!(
                "task {} was updated before it was created",
                self.id
            )));
        }
        Ok(())
    }
}

/// Fields supplied by the caller when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update. `None` leaves a field untouched; `due_date: Some(None)`
/// clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("title cannot be empty".to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn apply_to(&self, record: &mut TaskRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(due_date) = self.due_date {
            record.due_date = due_date;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }
}

/// Parse a `YYYY-MM-DD` date as typed on the command line.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        Error::InvalidArgument(format!("invalid date '{value}' (expected YYYY-MM-DD): {err}"))
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Unsigned(value) => value.to_string(),
        RawId::Signed(value) => value.to_string(),
    })
}

fn lenient_due_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|value| Some(value.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid dueDate '{trimmed}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> TaskRecord {
        serde_json::from_str(json).expect("record")
    }

    #[test]
    fn legacy_blob_record_is_accepted() {
        let task = record(
            r#"{
                "id": 1712345678901,
                "title": "Write report",
                "description": "",
                "priority": "high",
                "dueDate": "",
                "category": "work",
                "status": "pending",
                "createdAt": "2024-04-05T10:00:00.000Z",
                "updatedAt": "2024-04-05T10:00:00.000Z"
            }"#,
        );
        assert_eq!(task.id, "1712345678901");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, "work");
    }

    #[test]
    fn due_date_accepts_plain_and_timestamp_forms() {
        let plain = record(
            r#"{"id":"a","title":"t","dueDate":"2024-06-01",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        assert_eq!(plain.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));

        let stamped = record(
            r#"{"id":"a","title":"t","dueDate":"2024-06-01T09:30:00Z",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        assert_eq!(stamped.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let task = record(
            r#"{"id":"a","title":"t",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn serialized_keys_are_camel_case() {
        let task = record(
            r#"{"id":"a","title":"t","dueDate":"2024-06-01",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        let value = serde_json::to_value(&task).expect("json");
        assert_eq!(value["dueDate"], "2024-06-01");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn validate_rejects_blank_title_and_inverted_timestamps() {
        let mut task = record(
            r#"{"id":"a","title":"  ",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        assert!(matches!(task.validate(), Err(Error::Validation(_))));

        task.title = "ok".to_string();
        task.updated_at = task.created_at - chrono::Duration::seconds(1);
        assert!(matches!(task.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn completed_task_is_never_overdue() {
        let mut task = record(
            r#"{"id":"a","title":"t","dueDate":"2024-01-01",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        );
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).expect("date");
        assert!(task.is_overdue(today));
        assert!(!task.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date")));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn priority_and_status_parse_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().expect("priority"), Priority::High);
        assert_eq!(
            " Completed ".parse::<TaskStatus>().expect("status"),
            TaskStatus::Completed
        );
        assert!("urgent".parse::<Priority>().is_err());
    }
}
