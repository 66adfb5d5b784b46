//! Domain model for tasks and user settings.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted JSON shape stable across releases.
//!
//! # Invariants
//! - Every task is identified by a stable, creation-ordered `TaskId`.
//! - Task status only moves forward (`Active -> Completed`).

pub mod settings;
pub mod task;
