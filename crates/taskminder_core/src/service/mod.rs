//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate task store mutations into lifecycle operations.
//! - Run deadline polling against the same store.
//!
//! # Invariants
//! - Services borrow the store mutably, so one writer mutates it at a time.

pub mod reminder_service;
pub mod task_service;
