use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use super::Id;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Human label ("in progress").
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }

    /// Status reached by the list row's completion toggle.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err("unknown task status"),
        }
    }
}

/// Relative importance of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// All priorities in ascending order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err("unknown task priority"),
        }
    }
}

/// A task row as returned by the list endpoint.
///
/// `category_name` and `category_color` are computed by the backend from
/// `category_id`, which is why edits always refetch instead of patching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(
        default,
        deserialize_with = "deserialize_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
}

impl Task {
    /// Whether the task is past due and still open on `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < today)
    }
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, empty string, or null.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid due date: {raw}")))
}

/// `data` payload of the task list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Task editor payload used for both create and full update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Id>,
}

impl TaskDraft {
    /// Blank editor with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Pre-fill the editor from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            category_id: task.category_id,
        }
    }

    /// Trimmed copy ready to send.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Partial task update; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// `Some(None)` clears the due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    /// `Some(None)` removes the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<Id>>,
}

impl TaskPatch {
    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl From<TaskDraft> for TaskPatch {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            status: Some(draft.status),
            priority: Some(draft.priority),
            due_date: Some(draft.due_date),
            category_id: Some(draft.category_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!("completed".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn test_task_deserializes_backend_row() {
        let json = r##"{
            "id": 3,
            "title": "Write report",
            "description": null,
            "status": "in_progress",
            "priority": "high",
            "due_date": "2025-04-01T00:00:00.000Z",
            "category_id": 2,
            "category_name": "Work",
            "category_color": "#3B82F6"
        }"##;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(task.category_name.as_deref(), Some("Work"));
    }

    #[test]
    fn test_task_due_date_plain_and_empty() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"title":"t","due_date":"2025-01-02"}"#).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 2));

        let task: Task = serde_json::from_str(r#"{"id":1,"title":"t","due_date":""}"#).unwrap();
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let mut task: Task =
            serde_json::from_str(r#"{"id":1,"title":"t","due_date":"2025-05-09"}"#).unwrap();
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_draft_serializes_nulls_for_unset_fields() {
        let json = serde_json::to_value(TaskDraft::new("Buy milk")).unwrap();
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], "medium");
        assert!(json["due_date"].is_null());
        assert!(json["category_id"].is_null());
    }

    #[test]
    fn test_draft_normalized_trims_text() {
        let mut draft = TaskDraft::new("  Title  ");
        draft.description = "  notes ".to_string();
        let normalized = draft.normalized();
        assert_eq!(normalized.title, "Title");
        assert_eq!(normalized.description, "notes");
    }

    #[test]
    fn test_status_patch_only_sends_status() {
        let json = serde_json::to_string(&TaskPatch::status(TaskStatus::Completed)).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);
    }

    #[test]
    fn test_patch_from_draft_clears_unset_category() {
        let json = serde_json::to_value(TaskPatch::from(TaskDraft::new("Plan trip"))).unwrap();
        assert_eq!(json["title"], "Plan trip");
        assert!(json["category_id"].is_null());
        assert!(json.as_object().unwrap().contains_key("category_id"));
        assert!(json.as_object().unwrap().contains_key("due_date"));
    }
}
