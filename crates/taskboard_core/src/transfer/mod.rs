//! JSON export/import of whole boards.
//!
//! # Responsibility
//! - Encode the board as a versioned, human-readable export document.
//! - Parse and validate an import payload into a replacement board.
//!
//! # Invariants
//! - Import never yields a board that breaks `BoardState` invariants.
//! - Export output is pretty-printed with two-space indentation.

use crate::model::board::{BoardState, BoardStateParts};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format version written into every export document.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Import failure, carrying the reason for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Payload is not valid JSON.
    Parse(String),
    /// Payload is JSON but not a usable board.
    Structure(String),
}

impl ImportError {
    pub fn message(&self) -> &str {
        match self {
            Self::Parse(message) | Self::Structure(message) => message,
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "import payload is not valid json: {message}"),
            Self::Structure(message) => write!(f, "import payload is not a valid board: {message}"),
        }
    }
}

impl Error for ImportError {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    version: &'static str,
    export_date: String,
    #[serde(flatten)]
    board: &'a BoardState,
}

/// Renders the export document for `board` stamped with `exported_at`.
pub fn export_board(board: &BoardState, exported_at: DateTime<Utc>) -> String {
    let document = ExportDocument {
        version: EXPORT_FORMAT_VERSION,
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        board,
    };
    // Board fields are strings, dates and plain enums; encoding cannot fail.
    serde_json::to_string_pretty(&document).unwrap_or_default()
}

/// Suggested download name, e.g. `kanban-board-2024-05-01.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("kanban-board-{}.json", date.format("%Y-%m-%d"))
}

/// Parses an export document (or a bare `{columns, tasks}` snapshot).
///
/// # Errors
/// - `Parse` when `payload` is not JSON.
/// - `Structure` when `columns`/`tasks` are missing or mistyped, when a task
///   record is malformed, when the board has no columns, or when the board
///   breaks id uniqueness / list ownership invariants.
pub fn parse_import(payload: &str) -> Result<BoardState, ImportError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| ImportError::Parse(err.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ImportError::Structure("top-level value must be an object".to_string()))?;
    if !object.get("columns").is_some_and(Value::is_array) {
        return Err(ImportError::Structure(
            "`columns` must be an array".to_string(),
        ));
    }
    if !object.get("tasks").is_some_and(Value::is_object) {
        return Err(ImportError::Structure("`tasks` must be an object".to_string()));
    }

    let parts: BoardStateParts =
        serde_json::from_value(value).map_err(|err| ImportError::Structure(err.to_string()))?;
    if parts.columns.is_empty() {
        return Err(ImportError::Structure(
            "board must have at least one column".to_string(),
        ));
    }

    BoardState::try_from(parts).map_err(|err| ImportError::Structure(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, parse_import, ImportError};
    use chrono::NaiveDate;

    #[test]
    fn export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_file_name(date), "kanban-board-2024-05-01.json");
    }

    #[test]
    fn parse_import_distinguishes_parse_and_structure_errors() {
        assert!(matches!(parse_import("{not json"), Err(ImportError::Parse(_))));
        assert!(matches!(parse_import("[]"), Err(ImportError::Structure(_))));
        assert!(matches!(
            parse_import(r#"{"columns": {}, "tasks": {}}"#),
            Err(ImportError::Structure(_))
        ));
    }
}
