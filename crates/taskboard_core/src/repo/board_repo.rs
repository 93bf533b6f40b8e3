//! Board snapshot repository contracts and implementations.
//!
//! # Responsibility
//! - Load/save the single board snapshot under a fixed storage key.
//! - Load/save the theme preference independently of the board.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - One board per store: every board read/write uses `BOARD_STORAGE_KEY`.
//! - Read paths reject structurally invalid snapshots instead of masking them.

use crate::db::DbError;
use crate::model::board::{BoardState, BoardStateParts};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the board snapshot.
pub const BOARD_STORAGE_KEY: &str = "kanbanBoard";
/// Storage key of the dark-theme flag.
pub const THEME_STORAGE_KEY: &str = "kanbanTheme";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored value is not valid JSON for its slot.
    Serialization(serde_json::Error),
    /// Stored snapshot parses but breaks board invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored json: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted board data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence adapter for the board snapshot and theme flag.
pub trait BoardRepository {
    /// Returns `None` when nothing has been stored yet.
    fn load_board(&self) -> RepoResult<Option<BoardState>>;
    fn save_board(&self, board: &BoardState) -> RepoResult<()>;
    /// Returns `None` when no preference has been stored yet.
    fn load_theme(&self) -> RepoResult<Option<bool>>;
    fn save_theme(&self, dark: bool) -> RepoResult<()>;
}

#[derive(Serialize)]
struct PersistedBoardRef<'a> {
    #[serde(flatten)]
    board: &'a BoardState,
    timestamp: DateTime<Utc>,
}

/// Encodes a board as the stored `{columns, tasks, timestamp}` document.
pub fn encode_board_snapshot(board: &BoardState) -> RepoResult<String> {
    let document = PersistedBoardRef {
        board,
        timestamp: Utc::now(),
    };
    Ok(serde_json::to_string(&document)?)
}

/// Decodes a stored board document, validating board invariants.
pub fn decode_board_snapshot(raw: &str) -> RepoResult<BoardState> {
    let parts: BoardStateParts = serde_json::from_str(raw)?;
    BoardState::try_from(parts).map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// SQLite-backed key/value repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_value(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn load_board(&self) -> RepoResult<Option<BoardState>> {
        self.get_value(BOARD_STORAGE_KEY)?
            .map(|raw| decode_board_snapshot(&raw))
            .transpose()
    }

    fn save_board(&self, board: &BoardState) -> RepoResult<()> {
        let encoded = encode_board_snapshot(board)?;
        self.put_value(BOARD_STORAGE_KEY, &encoded)
    }

    fn load_theme(&self) -> RepoResult<Option<bool>> {
        self.get_value(THEME_STORAGE_KEY)?
            .map(|raw| serde_json::from_str::<bool>(&raw).map_err(RepoError::from))
            .transpose()
    }

    fn save_theme(&self, dark: bool) -> RepoResult<()> {
        self.put_value(THEME_STORAGE_KEY, &serde_json::to_string(&dark)?)
    }
}

/// In-process key/value repository.
///
/// Values are stored encoded, so loads go through the same decode path as the
/// SQLite store.
#[derive(Debug, Default)]
pub struct MemoryBoardRepository {
    values: RefCell<HashMap<&'static str, String>>,
}

impl MemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the board slot with a raw stored document.
    pub fn with_raw_board(raw: impl Into<String>) -> Self {
        let repo = Self::default();
        repo.values
            .borrow_mut()
            .insert(BOARD_STORAGE_KEY, raw.into());
        repo
    }

    /// Raw stored board document, if any.
    pub fn raw_board(&self) -> Option<String> {
        self.values.borrow().get(BOARD_STORAGE_KEY).cloned()
    }
}

impl BoardRepository for MemoryBoardRepository {
    fn load_board(&self) -> RepoResult<Option<BoardState>> {
        self.raw_board()
            .map(|raw| decode_board_snapshot(&raw))
            .transpose()
    }

    fn save_board(&self, board: &BoardState) -> RepoResult<()> {
        let encoded = encode_board_snapshot(board)?;
        self.values.borrow_mut().insert(BOARD_STORAGE_KEY, encoded);
        Ok(())
    }

    fn load_theme(&self) -> RepoResult<Option<bool>> {
        self.values
            .borrow()
            .get(THEME_STORAGE_KEY)
            .map(|raw| serde_json::from_str::<bool>(raw).map_err(RepoError::from))
            .transpose()
    }

    fn save_theme(&self, dark: bool) -> RepoResult<()> {
        self.values
            .borrow_mut()
            .insert(THEME_STORAGE_KEY, serde_json::to_string(&dark)?);
        Ok(())
    }
}
