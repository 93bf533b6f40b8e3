//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record stored inside board columns.
//! - Normalize loosely-typed input (priority, due date) into one shape.
//!
//! # Invariants
//! - `id` is stable and never reused for another task on the same board.
//! - `title` is non-empty after trim.
//! - "No due date" is always `None`, never an empty string.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a task. Unique across the whole board.
pub type TaskId = String;

const TASK_ID_PREFIX: &str = "task_";

/// Task priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Capitalized badge text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown priority `{other}`; expected low|medium|high"
            )),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Missing, null and "" all mean the default priority.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => value.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Validation failures for task field input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Editable task fields, as submitted by a create or edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Creates a draft with default priority and no due date.
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

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Returns a trimmed copy, rejecting blank titles.
    pub fn normalized(&self) -> Result<Self, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            due_date: self.due_date,
        })
    }
}

/// A single task card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from a draft with a freshly generated id.
    ///
    /// # Errors
    /// - Returns `EmptyTitle` when the draft title is blank.
    pub fn from_draft(draft: &TaskDraft) -> Result<Self, TaskValidationError> {
        let draft = draft.normalized()?;
        Ok(Self {
            id: generate_task_id(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: Utc::now(),
        })
    }

    /// Overwrites the editable fields. `id` and `created_at` are untouched.
    pub fn apply(&mut self, draft: &TaskDraft) -> Result<(), TaskValidationError> {
        let draft = draft.normalized()?;
        self.title = draft.title;
        self.description = draft.description;
        self.priority = draft.priority;
        self.due_date = draft.due_date;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Generates a random task id (`task_<32 hex>`).
pub fn generate_task_id() -> TaskId {
    format!("{TASK_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Parses a due date from user or file input.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept). Blank input
/// means no due date.
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(timestamp.date_naive()));
    }
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid due date `{trimmed}`; expected YYYY-MM-DD"))
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => parse_due_date(&value).map_err(serde::de::Error::custom),
    }
}
