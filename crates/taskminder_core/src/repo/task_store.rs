//! Authoritative in-memory task collection with whole-collection persistence.
//!
//! # Responsibility
//! - Own the ordered task list and restore it from the key-value store.
//! - Issue creation-ordered task ids.
//!
//! # Invariants
//! - Insertion order is preserved; it is the tie-breaker for ordering views.
//! - Every save replaces the full persisted collection.
//! - A failed save never rolls back memory; it only clears the durable flag.
//! - Recovery after a failed save never discards tasks written by other
//!   processes and never clears a `notified` flag.
//! - Issued ids are strictly increasing and never collide with loaded ids.

use crate::model::task::{Task, TaskId};
use crate::repo::kv_store::{KeyValueStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::HashSet;

/// Storage key holding the serialized task array.
pub const TASKS_KEY: &str = "eq_tasks";

pub struct TaskStore<S: KeyValueStore> {
    kv: S,
    tasks: Vec<Task>,
    last_id: TaskId,
    durable: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Restores the collection from `kv`.
    ///
    /// Absent, unreadable or malformed state yields an empty collection.
    pub fn open(kv: S) -> Self {
        let tasks = load(&kv);
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Self {
            kv,
            tasks,
            last_id,
            durable: true,
        }
    }

    /// Persists the full collection, replacing prior state.
    ///
    /// # Errors
    /// - Returns `StorageError` when serialization or the backend write fails.
    ///   In-memory tasks are kept and `is_durable()` turns `false`.
    pub fn save_all(&mut self) -> StorageResult<()> {
        let result = serde_json::to_string(&self.tasks)
            .map_err(StorageError::from)
            .and_then(|payload| self.kv.put(TASKS_KEY, &payload));

        match result {
            Ok(()) => {
                self.durable = true;
                Ok(())
            }
            Err(err) => {
                self.durable = false;
                error!(
                    "event=tasks_save module=task_store status=error task_count={} error={}",
                    self.tasks.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Re-reads the persisted collection, picking up writes from other processes.
    ///
    /// Skipped while unsaved changes exist (`is_durable() == false`); returns
    /// whether the reload happened.
    pub fn reload(&mut self) -> bool {
        if !self.durable {
            return false;
        }
        self.tasks = load(&self.kv);
        let loaded_max = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        self.last_id = self.last_id.max(loaded_max);
        true
    }

    /// Restores durability after a failed save.
    ///
    /// The persisted collection is re-read and the `notified` flags raised in
    /// memory are carried onto it before it is written back, so tasks added by
    /// other processes survive. No-op while the store is durable.
    ///
    /// # Errors
    /// - Returns `StorageError` when the read or the write fails. Memory is
    ///   left untouched and the store stays non-durable.
    pub fn resync(&mut self) -> StorageResult<()> {
        if self.durable {
            return Ok(());
        }

        let notified: HashSet<TaskId> = self
            .tasks
            .iter()
            .filter(|task| task.notified)
            .map(|task| task.id)
            .collect();
        let mut merged = read_persisted(&self.kv)?;
        for task in merged.iter_mut().filter(|task| notified.contains(&task.id)) {
            task.mark_notified();
        }

        let payload = serde_json::to_string(&merged)?;
        self.kv.put(TASKS_KEY, &payload)?;

        let loaded_max = merged.iter().map(|task| task.id).max().unwrap_or(0);
        self.last_id = self.last_id.max(loaded_max);
        self.tasks = merged;
        self.durable = true;
        info!(
            "event=tasks_resync module=task_store status=ok task_count={}",
            self.tasks.len()
        );
        Ok(())
    }

    /// Returns a fresh id derived from `now`, bumped past the last issued id.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> TaskId {
        let candidate = now.timestamp_millis();
        let id = if candidate > self.last_id {
            candidate
        } else {
            self.last_id + 1
        };
        self.last_id = id;
        id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn push(&mut self, task: Task) {
        self.last_id = self.last_id.max(task.id);
        self.tasks.push(task);
    }

    /// Keeps tasks matching `keep`; returns how many were removed.
    pub fn retain(&mut self, keep: impl FnMut(&Task) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(keep);
        before - self.tasks.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `false` after a failed save until the next successful one.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.kv
    }
}

/// Reads the persisted collection, treating any failure as absent state.
pub fn load<S: KeyValueStore + ?Sized>(kv: &S) -> Vec<Task> {
    read_persisted(kv).unwrap_or_else(|err| {
        warn!("event=tasks_load module=task_store status=fallback reason=read_failed error={err}");
        Vec::new()
    })
}

/// Backend read failures propagate; malformed payloads read as empty.
fn read_persisted<S: KeyValueStore + ?Sized>(kv: &S) -> StorageResult<Vec<Task>> {
    let Some(payload) = kv.get(TASKS_KEY)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<Task>>(&payload) {
        Ok(mut tasks) => {
            tasks.iter_mut().for_each(Task::backfill_completed_at);
            Ok(tasks)
        }
        Err(err) => {
            warn!(
                "event=tasks_load module=task_store status=fallback reason=malformed line={} column={}",
                err.line(),
                err.column()
            );
            Ok(Vec::new())
        }
    }
}
