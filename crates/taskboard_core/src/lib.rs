//! Board state engine for a single-user task board.
//! This crate is the single source of truth for board invariants; renderers
//! only read views of it and send commands back.

pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod transfer;

pub use history::{HistoryEntry, HistoryStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    BoardState, BoardStateError, BoardStateParts, BoardStatistics, Column, ColumnId,
    DONE_COLUMN_ID, FALLBACK_COLUMN_TITLE, IN_PROGRESS_COLUMN_ID,
};
pub use model::task::{parse_due_date, Priority, Task, TaskDraft, TaskId, TaskValidationError};
pub use repo::board_repo::{
    BoardRepository, MemoryBoardRepository, RepoError, RepoResult, SqliteBoardRepository,
    BOARD_STORAGE_KEY, THEME_STORAGE_KEY,
};
pub use search::filter::{
    column_views, matches, matches_at, ColumnContent, ColumnView, FilterQuery, ViewFilter,
};
pub use service::board_service::{
    BoardService, BoardServiceError, MoveOutcome, ServiceResult, DEFAULT_DARK_THEME,
};
pub use transfer::{export_board, export_file_name, parse_import, ImportError, EXPORT_FORMAT_VERSION};

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
