//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate board mutations, history checkpoints and persistence.
//! - Keep presentation layers decoupled from storage details.

pub mod board_service;
