//! Board domain model.
//!
//! # Responsibility
//! - Define the column/task records and the board aggregate that owns them.
//! - Provide pure queries (lookups, statistics) over the board.
//!
//! # Invariants
//! - Tasks are contained positionally: a task never stores its column id.
//! - Every task id is unique across the whole board.

pub mod board;
pub mod task;
