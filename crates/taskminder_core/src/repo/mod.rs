//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract.
//! - Own the authoritative task collection and settings persistence.
//!
//! # Invariants
//! - Malformed persisted state is treated as absent, never propagated.
//! - Writes replace whole values; there are no partial writes.

pub mod kv_store;
pub mod settings_store;
pub mod task_store;
