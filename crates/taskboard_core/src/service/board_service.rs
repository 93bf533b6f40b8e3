//! Board use-case service: the mutation engine.
//!
//! # Responsibility
//! - Own the live board, its undo/redo history and the persistence adapter.
//! - Provide create/update/delete/move commands, undo/redo and import/export.
//!
//! # Invariants
//! - Every command either succeeds (mutate, persist, checkpoint) or fails
//!   without touching board, history or store.
//! - Persistence failures never fail a command; they are logged and kept as
//!   the latest persist warning.
//! - History always holds at least the baseline entry after `open`.

use crate::history::HistoryStore;
use crate::model::board::{BoardState, BoardStateError, BoardStatistics, Column, ColumnId};
use crate::model::task::{generate_task_id, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::board_repo::{BoardRepository, RepoError};
use crate::search::filter::{column_views, ColumnView, FilterQuery};
use crate::transfer::{export_board, parse_import, ImportError};
use chrono::Utc;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Theme used when no preference has been stored.
pub const DEFAULT_DARK_THEME: bool = true;

/// Errors from board commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardServiceError {
    /// Command referenced a column id absent from the board.
    UnknownColumn(ColumnId),
    /// Title is blank on create or update.
    InvalidTask(TaskValidationError),
    /// Task id is not in the stated column.
    TaskNotFound { task_id: TaskId, column_id: ColumnId },
    /// Import payload is unparsable or not a valid board.
    Import(ImportError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn(id) => write!(f, "unknown column: `{id}`"),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::TaskNotFound { task_id, column_id } => {
                write!(f, "task `{task_id}` not found in column `{column_id}`")
            }
            Self::Import(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::Import(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for BoardServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<ImportError> for BoardServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<BoardStateError> for BoardServiceError {
    fn from(value: BoardStateError) -> Self {
        match value {
            BoardStateError::UnknownColumn(id) => Self::UnknownColumn(id),
            BoardStateError::InvalidTask { source, .. } => Self::InvalidTask(source),
            other => Self::Import(ImportError::Structure(other.to_string())),
        }
    }
}

pub type ServiceResult<T> = Result<T, BoardServiceError>;

/// Result of a drag-and-drop move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Task now sits at the end of the target column.
    Moved,
    /// Task was no longer in the source column; nothing changed.
    SourceMissing,
}

/// Board service facade over a persistence adapter.
pub struct BoardService<R: BoardRepository> {
    repo: R,
    board: BoardState,
    history: HistoryStore,
    dark_theme: bool,
    last_persist_error: Option<RepoError>,
}

impl<R: BoardRepository> BoardService<R> {
    /// Loads the stored board (or seeds the default template) and records the
    /// history baseline.
    ///
    /// A missing, unreadable or column-less snapshot falls back to the
    /// default four-column board, which is persisted right away.
    pub fn open(repo: R) -> Self {
        let loaded = match repo.load_board() {
            Ok(Some(board)) if !board.columns().is_empty() => Some(board),
            Ok(_) => None,
            Err(err) => {
                error!(
                    "event=board_load module=service status=error error_code=board_load_failed error={err}"
                );
                None
            }
        };

        let dark_theme = match repo.load_theme() {
            Ok(theme) => theme.unwrap_or(DEFAULT_DARK_THEME),
            Err(err) => {
                warn!(
                    "event=theme_load module=service status=error error_code=theme_load_failed error={err}"
                );
                DEFAULT_DARK_THEME
            }
        };

        let seeded = loaded.is_none();
        let mut service = Self {
            repo,
            board: loaded.unwrap_or_else(BoardState::with_default_columns),
            history: HistoryStore::new(),
            dark_theme,
            last_persist_error: None,
        };
        if seeded {
            service.persist();
        }
        service.history.checkpoint(&service.board);

        info!(
            "event=board_open module=service status=ok seeded={} columns={} tasks={}",
            seeded,
            service.board.columns().len(),
            service.board.task_count()
        );
        service
    }

    /// Read-only view of the live board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn columns(&self) -> &[Column] {
        self.board.columns()
    }

    pub fn tasks_in(&self, column_id: &str) -> ServiceResult<&[Task]> {
        Ok(self.board.tasks_in(column_id)?)
    }

    pub fn column_title(&self, column_id: &str) -> &str {
        self.board.column_title(column_id)
    }

    pub fn statistics(&self) -> BoardStatistics {
        self.board.statistics()
    }

    /// Live board projected through `query`.
    pub fn column_views(&self, query: &FilterQuery) -> Vec<ColumnView<'_>> {
        column_views(&self.board, query)
    }

    /// Appends a new task to the end of `column_id`.
    ///
    /// # Errors
    /// - `UnknownColumn` when `column_id` is not on the board.
    /// - `InvalidTask` when the trimmed title is empty.
    pub fn add_task(&mut self, column_id: &str, draft: &TaskDraft) -> ServiceResult<TaskId> {
        if !self.board.has_column(column_id) {
            return Err(self.reject(
                "task_create",
                BoardServiceError::UnknownColumn(column_id.to_string()),
            ));
        }
        let mut task =
            Task::from_draft(draft).map_err(|err| self.reject("task_create", err.into()))?;
        while self.board.contains_task(&task.id) {
            task.id = generate_task_id();
        }
        let task_id = task.id.clone();

        self.tasks_mut(column_id)?.push(task);
        self.commit();
        info!(
            "event=task_create module=service status=ok task_id={task_id} column_id={column_id}"
        );
        Ok(task_id)
    }

    /// Replaces the editable fields of a task in place.
    ///
    /// # Errors
    /// - `UnknownColumn` when `column_id` is not on the board.
    /// - `TaskNotFound` when the task is not in `column_id`.
    /// - `InvalidTask` when the trimmed title is empty.
    pub fn update_task(
        &mut self,
        task_id: &str,
        column_id: &str,
        draft: &TaskDraft,
    ) -> ServiceResult<()> {
        let normalized = match draft.normalized() {
            Ok(normalized) => normalized,
            Err(err) => return Err(self.reject("task_update", err.into())),
        };
        let index = self
            .locate(task_id, column_id)
            .map_err(|err| self.reject("task_update", err))?;

        let task = &mut self.tasks_mut(column_id)?[index];
        task.apply(&normalized)?;
        self.commit();
        info!(
            "event=task_update module=service status=ok task_id={task_id} column_id={column_id}"
        );
        Ok(())
    }

    /// Removes a task. Repeating the call fails with `TaskNotFound`.
    pub fn delete_task(&mut self, task_id: &str, column_id: &str) -> ServiceResult<Task> {
        let index = self
            .locate(task_id, column_id)
            .map_err(|err| self.reject("task_delete", err))?;

        let removed = self.tasks_mut(column_id)?.remove(index);
        self.commit();
        info!(
            "event=task_delete module=service status=ok task_id={task_id} column_id={column_id}"
        );
        Ok(removed)
    }

    /// Moves a task from `source_column_id` to the end of `target_column_id`.
    ///
    /// Dropping a task onto its own column moves it to the end of that
    /// column. A task that is no longer in the source column is a no-op.
    ///
    /// # Errors
    /// - `UnknownColumn` when the target column is not on the board; checked
    ///   before anything is removed.
    pub fn move_task(
        &mut self,
        task_id: &str,
        source_column_id: &str,
        target_column_id: &str,
    ) -> ServiceResult<MoveOutcome> {
        if !self.board.has_column(target_column_id) {
            return Err(self.reject(
                "task_move",
                BoardServiceError::UnknownColumn(target_column_id.to_string()),
            ));
        }

        let Some(index) = self
            .board
            .tasks_in(source_column_id)
            .ok()
            .and_then(|tasks| tasks.iter().position(|task| task.id == task_id))
        else {
            info!(
                "event=task_move module=service status=noop task_id={task_id} source={source_column_id} target={target_column_id}"
            );
            return Ok(MoveOutcome::SourceMissing);
        };

        let task = self.tasks_mut(source_column_id)?.remove(index);
        self.tasks_mut(target_column_id)?.push(task);
        self.commit();
        info!(
            "event=task_move module=service status=ok task_id={task_id} source={source_column_id} target={target_column_id}"
        );
        Ok(MoveOutcome::Moved)
    }

    /// Reinstalls the previous snapshot. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.install(snapshot);
        info!("event=history_undo module=service status=ok");
        true
    }

    /// Reinstalls the next snapshot. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.install(snapshot);
        info!("event=history_redo module=service status=ok");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Pretty-printed export document for the live board.
    pub fn export_json(&self) -> String {
        info!(
            "event=board_export module=service status=ok columns={} tasks={}",
            self.board.columns().len(),
            self.board.task_count()
        );
        export_board(&self.board, Utc::now())
    }

    /// Replaces the whole board from an export payload and resets history to
    /// a single baseline.
    ///
    /// # Errors
    /// - `Import` when the payload is unparsable or not a valid board; the
    ///   live board and history are left untouched.
    pub fn import_json(&mut self, payload: &str) -> ServiceResult<()> {
        let board = parse_import(payload).map_err(|err| self.reject("board_import", err.into()))?;
        self.board = board;
        self.persist();
        self.history.reset(&self.board);
        info!(
            "event=board_import module=service status=ok columns={} tasks={}",
            self.board.columns().len(),
            self.board.task_count()
        );
        Ok(())
    }

    pub fn is_dark_theme(&self) -> bool {
        self.dark_theme
    }

    /// Stores the theme flag independently of the board snapshot.
    pub fn set_dark_theme(&mut self, dark: bool) {
        self.dark_theme = dark;
        if let Err(err) = self.repo.save_theme(dark) {
            warn!(
                "event=theme_persist module=service status=error error_code=theme_save_failed error={err}"
            );
            self.last_persist_error = Some(err);
        }
    }

    /// Most recent persistence failure, if any.
    pub fn last_persist_error(&self) -> Option<&RepoError> {
        self.last_persist_error.as_ref()
    }

    /// Returns and clears the most recent persistence failure.
    pub fn take_persist_error(&mut self) -> Option<RepoError> {
        self.last_persist_error.take()
    }

    fn locate(&self, task_id: &str, column_id: &str) -> ServiceResult<usize> {
        self.board
            .tasks_in(column_id)?
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| BoardServiceError::TaskNotFound {
                task_id: task_id.to_string(),
                column_id: column_id.to_string(),
            })
    }

    fn tasks_mut(&mut self, column_id: &str) -> ServiceResult<&mut Vec<Task>> {
        self.board
            .column_tasks_mut(column_id)
            .ok_or_else(|| BoardServiceError::UnknownColumn(column_id.to_string()))
    }

    fn reject(&self, event: &str, err: BoardServiceError) -> BoardServiceError {
        warn!("event={event} module=service status=error error={err}");
        err
    }

    fn install(&mut self, snapshot: BoardState) {
        self.board = snapshot;
        self.persist();
    }

    fn commit(&mut self) {
        self.persist();
        self.history.checkpoint(&self.board);
    }

    fn persist(&mut self) {
        match self.repo.save_board(&self.board) {
            Ok(()) => {
                self.last_persist_error = None;
            }
            Err(err) => {
                warn!(
                    "event=board_persist module=service status=error error_code=board_save_failed error={err}"
                );
                self.last_persist_error = Some(err);
            }
        }
    }
}
