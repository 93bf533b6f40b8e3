//! Board domain model: ordered columns owning ordered task lists.
//!
//! # Responsibility
//! - Hold the live column/task state and its read-only queries.
//! - Reject structurally inconsistent boards at construction time.
//!
//! # Invariants
//! - Every column id has exactly one task list; no orphan lists.
//! - A task id appears at most once across all columns.
//! - Task order within a column is arrival order.

use crate::model::task::{Priority, Task, TaskId, TaskValidationError};
use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a column.
pub type ColumnId = String;

/// Column id counted as "completed" by statistics.
pub const DONE_COLUMN_ID: &str = "done";
/// Column id counted as "in progress" by statistics.
pub const IN_PROGRESS_COLUMN_ID: &str = "inprogress";
/// Title returned for column ids that are not on the board.
pub const FALLBACK_COLUMN_TITLE: &str = "Column";

const DEFAULT_COLUMNS: [(&str, &str); 4] = [
    ("todo", "To Do"),
    (IN_PROGRESS_COLUMN_ID, "In Progress"),
    ("review", "Review"),
    (DONE_COLUMN_ID, "Done"),
];

/// A single board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Structural and lookup errors for board state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStateError {
    /// Column id is not part of the board.
    UnknownColumn(ColumnId),
    /// Two columns share the same id.
    DuplicateColumn(ColumnId),
    /// Column has no task list.
    MissingTaskList(ColumnId),
    /// Task list keyed by an id that is not a column.
    OrphanTaskList(ColumnId),
    /// Task id occurs more than once on the board.
    DuplicateTask(TaskId),
    /// Stored task fails field validation.
    InvalidTask {
        task_id: TaskId,
        source: TaskValidationError,
    },
}

impl Display for BoardStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn(id) => write!(f, "unknown column: `{id}`"),
            Self::DuplicateColumn(id) => write!(f, "duplicate column id: `{id}`"),
            Self::MissingTaskList(id) => write!(f, "column `{id}` has no task list"),
            Self::OrphanTaskList(id) => {
                write!(f, "task list `{id}` does not belong to any column")
            }
            Self::DuplicateTask(id) => write!(f, "duplicate task id: `{id}`"),
            Self::InvalidTask { task_id, source } => {
                write!(f, "invalid task `{task_id}`: {source}")
            }
        }
    }
}

impl Error for BoardStateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Unvalidated board shape as found in snapshots and export files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardStateParts {
    pub columns: Vec<Column>,
    pub tasks: BTreeMap<ColumnId, Vec<Task>>,
}

/// Live board: ordered columns plus one ordered task list per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardStateParts")]
pub struct BoardState {
    columns: Vec<Column>,
    tasks: BTreeMap<ColumnId, Vec<Task>>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::with_default_columns()
    }
}

impl TryFrom<BoardStateParts> for BoardState {
    type Error = BoardStateError;

    fn try_from(value: BoardStateParts) -> Result<Self, Self::Error> {
        Self::from_parts(value.columns, value.tasks)
    }
}

impl BoardState {
    /// The four-column starter board (`todo`, `inprogress`, `review`, `done`).
    pub fn with_default_columns() -> Self {
        let columns = DEFAULT_COLUMNS
            .iter()
            .map(|(id, title)| Column::new(*id, *title))
            .collect();
        Self::with_columns(columns)
    }

    /// Empty board over the given columns.
    ///
    /// Later duplicates of a column id are dropped.
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let mut seen = HashSet::new();
        let columns: Vec<Column> = columns
            .into_iter()
            .filter(|column| seen.insert(column.id.clone()))
            .collect();
        let tasks = columns
            .iter()
            .map(|column| (column.id.clone(), Vec::new()))
            .collect();
        Self { columns, tasks }
    }

    /// Builds a board from raw parts, enforcing structural invariants.
    ///
    /// # Errors
    /// - `DuplicateColumn` when two columns share an id.
    /// - `MissingTaskList` / `OrphanTaskList` when lists and columns disagree.
    /// - `DuplicateTask` when a task id occurs twice anywhere on the board.
    /// - `InvalidTask` when a stored task has a blank title.
    pub fn from_parts(
        columns: Vec<Column>,
        tasks: BTreeMap<ColumnId, Vec<Task>>,
    ) -> Result<Self, BoardStateError> {
        let mut column_ids = HashSet::new();
        for column in &columns {
            if !column_ids.insert(column.id.as_str()) {
                return Err(BoardStateError::DuplicateColumn(column.id.clone()));
            }
            if !tasks.contains_key(&column.id) {
                return Err(BoardStateError::MissingTaskList(column.id.clone()));
            }
        }

        let mut task_ids = HashSet::new();
        for (column_id, column_tasks) in &tasks {
            if !column_ids.contains(column_id.as_str()) {
                return Err(BoardStateError::OrphanTaskList(column_id.clone()));
            }
            for task in column_tasks {
                task.validate()
                    .map_err(|source| BoardStateError::InvalidTask {
                        task_id: task.id.clone(),
                        source,
                    })?;
                if !task_ids.insert(task.id.as_str()) {
                    return Err(BoardStateError::DuplicateTask(task.id.clone()));
                }
            }
        }

        Ok(Self { columns, tasks })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        self.tasks.contains_key(column_id)
    }

    /// Ordered tasks of one column.
    pub fn tasks_in(&self, column_id: &str) -> Result<&[Task], BoardStateError> {
        self.tasks
            .get(column_id)
            .map(Vec::as_slice)
            .ok_or_else(|| BoardStateError::UnknownColumn(column_id.to_string()))
    }

    /// Column title, or `"Column"` when the id is not on the board.
    pub fn column_title(&self, column_id: &str) -> &str {
        self.columns
            .iter()
            .find(|column| column.id == column_id)
            .map_or(FALLBACK_COLUMN_TITLE, |column| column.title.as_str())
    }

    /// Locates a task anywhere on the board.
    pub fn find_task(&self, task_id: &str) -> Option<(&str, &Task)> {
        self.tasks.iter().find_map(|(column_id, column_tasks)| {
            column_tasks
                .iter()
                .find(|task| task.id == task_id)
                .map(|task| (column_id.as_str(), task))
        })
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.find_task(task_id).is_some()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    /// Iterates `(column_id, task)` pairs in column order.
    pub fn iter_tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.columns.iter().flat_map(move |column| {
            self.tasks
                .get(&column.id)
                .into_iter()
                .flatten()
                .map(move |task| (column.id.as_str(), task))
        })
    }

    /// Card highlight rule: due before now and not in the `done` column.
    pub fn is_task_overdue(&self, task: &Task, column_id: &str) -> bool {
        is_task_overdue_at(task, column_id, Local::now().naive_local())
    }

    /// Aggregate counters using the current local time.
    pub fn statistics(&self) -> BoardStatistics {
        self.statistics_at(Local::now().naive_local())
    }

    /// Aggregate counters evaluated against an explicit local `now`.
    pub fn statistics_at(&self, now: NaiveDateTime) -> BoardStatistics {
        let mut stats = BoardStatistics::default();
        for (column_id, task) in self.iter_tasks() {
            stats.total_tasks += 1;
            if column_id == DONE_COLUMN_ID {
                stats.completed_tasks += 1;
            } else if column_id == IN_PROGRESS_COLUMN_ID {
                stats.in_progress += 1;
            }
            if task.priority == Priority::High {
                stats.high_priority += 1;
            }
            if is_task_overdue_at(task, column_id, now) {
                stats.overdue_tasks += 1;
            }
        }
        stats.completion_rate = completion_rate(stats.completed_tasks, stats.total_tasks);
        stats
    }

    pub(crate) fn into_parts(self) -> BoardStateParts {
        BoardStateParts {
            columns: self.columns,
            tasks: self.tasks,
        }
    }

    pub(crate) fn column_tasks_mut(&mut self, column_id: &str) -> Option<&mut Vec<Task>> {
        self.tasks.get_mut(column_id)
    }
}

/// Derived board counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStatistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress: usize,
    pub high_priority: usize,
    pub overdue_tasks: usize,
    /// Percentage in `0..=100`, rounded half up.
    pub completion_rate: u32,
}

impl BoardStatistics {
    /// Header text, e.g. `3/10 tasks completed • 2 overdue`.
    pub fn summary_line(&self) -> String {
        format!(
            "{}/{} tasks completed • {} overdue",
            self.completed_tasks, self.total_tasks, self.overdue_tasks
        )
    }
}

/// True when the due date has started before `now` (local midnight of the
/// due day).
pub(crate) fn is_due_before(task: &Task, now: NaiveDateTime) -> bool {
    task.due_date
        .is_some_and(|due| due.and_time(NaiveTime::MIN) < now)
}

fn is_task_overdue_at(task: &Task, column_id: &str, now: NaiveDateTime) -> bool {
    column_id != DONE_COLUMN_ID && is_due_before(task, now)
}

fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // round(completed / total * 100) with halves rounded up, in integers.
    let rate = (200 * completed + total) / (2 * total);
    u32::try_from(rate).unwrap_or(100)
}
