//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the snapshot persistence contract used by the board service.
//! - Isolate SQLite and JSON encoding details from mutation logic.
//!
//! # Invariants
//! - Stored boards are validated on read with the same rules as imports.

pub mod board_repo;
