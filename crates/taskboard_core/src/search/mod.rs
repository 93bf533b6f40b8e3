//! Search and view-filter entry points.
//!
//! # Responsibility
//! - Expose the task visibility predicate used to build displayed subsets.
//!
//! # Invariants
//! - Filtering never mutates board state.

pub mod filter;
