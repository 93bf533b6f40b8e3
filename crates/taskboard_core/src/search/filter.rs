//! Task filter predicate and filtered column projections.
//!
//! # Responsibility
//! - Decide whether one task is visible for a search text and view filter.
//! - Project the board into per-column views for renderers.
//!
//! # Invariants
//! - Matching is pure: it never mutates the task or the board.
//! - `Overdue` ignores column membership, unlike the overdue statistic.

use crate::model::board::{is_due_before, BoardState, Column};
use crate::model::task::{Priority, Task};
use chrono::{Local, NaiveDateTime};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named view filter applied after the free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewFilter {
    #[default]
    All,
    /// Due date is today's local calendar date.
    Today,
    /// Due date started before now.
    Overdue,
    HighPriority,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 4] = [Self::All, Self::Today, Self::Overdue, Self::HighPriority];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Overdue => "overdue",
            Self::HighPriority => "high-priority",
        }
    }
}

// Unknown names behave like `all`, the way an unrecognized view tab would.
impl FromStr for ViewFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "today" => Self::Today,
            "overdue" => Self::Overdue,
            "high-priority" => Self::HighPriority,
            _ => Self::All,
        })
    }
}

impl Display for ViewFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active search text plus view filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    /// Case-insensitive substring matched against title and description.
    pub text: String,
    pub view: ViewFilter,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>, view: ViewFilter) -> Self {
        Self {
            text: text.into(),
            view,
        }
    }

    pub fn view(view: ViewFilter) -> Self {
        Self::new(String::new(), view)
    }

    /// Whether this query can hide anything at all.
    pub fn is_pass_through(&self) -> bool {
        self.text.is_empty() && self.view == ViewFilter::All
    }
}

/// Visibility predicate using the current local time.
pub fn matches(task: &Task, search_text: &str, view: ViewFilter) -> bool {
    matches_at(task, search_text, view, Local::now().naive_local())
}

/// Visibility predicate evaluated against an explicit local `now`.
pub fn matches_at(task: &Task, search_text: &str, view: ViewFilter, now: NaiveDateTime) -> bool {
    if !search_text.is_empty() {
        let needle = search_text.to_lowercase();
        if !task.title.to_lowercase().contains(&needle)
            && !task.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }

    match view {
        ViewFilter::All => true,
        ViewFilter::Today => task.due_date == Some(now.date()),
        ViewFilter::Overdue => is_due_before(task, now),
        ViewFilter::HighPriority => task.priority == Priority::High,
    }
}

/// What a renderer should draw inside one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnContent<'a> {
    /// Column holds no tasks at all.
    Empty,
    /// Column holds tasks but the query hides every one of them.
    NoMatches,
    /// Visible tasks in column order.
    Tasks(Vec<&'a Task>),
}

/// One column as seen through a filter query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    /// Unfiltered task count, for column header badges.
    pub total: usize,
    pub content: ColumnContent<'a>,
}

/// Projects every column through `query`, in column order.
pub fn column_views<'a>(board: &'a BoardState, query: &FilterQuery) -> Vec<ColumnView<'a>> {
    column_views_at(board, query, Local::now().naive_local())
}

pub fn column_views_at<'a>(
    board: &'a BoardState,
    query: &FilterQuery,
    now: NaiveDateTime,
) -> Vec<ColumnView<'a>> {
    board
        .columns()
        .iter()
        .map(|column| {
            let tasks = board.tasks_in(&column.id).unwrap_or_default();
            let visible: Vec<&Task> = tasks
                .iter()
                .filter(|task| matches_at(task, &query.text, query.view, now))
                .collect();
            let content = if tasks.is_empty() {
                ColumnContent::Empty
            } else if visible.is_empty() {
                ColumnContent::NoMatches
            } else {
                ColumnContent::Tasks(visible)
            };
            ColumnView {
                column,
                total: tasks.len(),
                content,
            }
        })
        .collect()
}
