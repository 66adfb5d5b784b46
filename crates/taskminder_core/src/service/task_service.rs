//! Task lifecycle use-case service.
//!
//! # Responsibility
//! - Create, complete, delete and prune tasks.
//! - Expand recurring tasks into their next occurrence on completion.
//!
//! # Invariants
//! - Every successful mutation is followed by a whole-collection save.
//! - A save failure keeps the in-memory mutation (see `TaskStore::save_all`).
//! - A task spawns at most one successor because completion is one-way.

use crate::clock::Clock;
use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::ordering::{order_active, order_history};
use crate::repo::kv_store::{KeyValueStore, StorageError};
use crate::repo::task_store::TaskStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskError>;

/// Lifecycle operation failure.
#[derive(Debug)]
pub enum TaskError {
    Validation(TaskValidationError),
    NotFound(TaskId),
    AlreadyCompleted(TaskId),
    /// The mutation was applied in memory but could not be persisted.
    Storage(StorageError),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyCompleted(id) => write!(f, "task already completed: {id}"),
            Self::Storage(err) => write!(f, "changes kept in memory but not saved: {err}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyCompleted(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for TaskError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Outcome of completing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionResult {
    pub completed: TaskId,
    /// Id of the next occurrence for recurring tasks.
    pub successor: Option<TaskId>,
}

impl CompletionResult {
    pub fn spawned_successor(&self) -> bool {
        self.successor.is_some()
    }
}

/// Lifecycle manager over a borrowed task store.
pub struct TaskService<'a, S: KeyValueStore, C: Clock> {
    store: &'a mut TaskStore<S>,
    clock: C,
}

impl<'a, S: KeyValueStore, C: Clock> TaskService<'a, S, C> {
    pub fn new(store: &'a mut TaskStore<S>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Validates `draft`, appends the new active task and persists.
    ///
    /// # Errors
    /// - `Validation` when the title is blank or the deadline is missing;
    ///   nothing is stored.
    /// - `Storage` when persistence fails; the task stays in memory.
    pub fn create_task(&mut self, draft: TaskDraft) -> TaskResult<Task> {
        if let Err(err) = draft.validate() {
            warn!("event=task_create module=task_service status=rejected reason={err:?}");
            return Err(err.into());
        }

        let id = self.store.next_id(self.clock.now());
        let task = draft.into_task(id)?;
        self.store.push(task.clone());
        self.persist("task_create", id)?;

        info!(
            "event=task_create module=task_service status=ok task_id={} priority={} frequency={}",
            task.id, task.priority, task.frequency
        );
        Ok(task)
    }

    /// Completes a task and spawns its next occurrence when recurring.
    ///
    /// The successor deadline is the original deadline plus one interval,
    /// regardless of when completion happens.
    ///
    /// # Errors
    /// - `NotFound` / `AlreadyCompleted` leave the store untouched.
    /// - `Storage` when persistence fails; the completion stays in memory.
    pub fn complete_task(&mut self, id: TaskId) -> TaskResult<CompletionResult> {
        let now = self.clock.now();
        let task = match self.store.get_mut(id) {
            Some(task) => task,
            None => {
                warn!("event=task_complete module=task_service status=not_found task_id={id}");
                return Err(TaskError::NotFound(id));
            }
        };

        if !task.complete(now) {
            warn!("event=task_complete module=task_service status=already_completed task_id={id}");
            return Err(TaskError::AlreadyCompleted(id));
        }

        let parent = task.clone();
        let successor = match parent.frequency.interval() {
            Some(_) => {
                let next_id = self.store.next_id(now);
                parent.successor(next_id).map(|next| {
                    self.store.push(next);
                    next_id
                })
            }
            None => None,
        };

        self.persist("task_complete", id)?;
        info!(
            "event=task_complete module=task_service status=ok task_id={} successor_id={}",
            id,
            successor.map_or_else(|| "none".to_string(), |next| next.to_string())
        );

        Ok(CompletionResult {
            completed: id,
            successor,
        })
    }

    /// Removes a task by id.
    ///
    /// # Errors
    /// - `NotFound` when no task matches; the store is unchanged.
    pub fn delete_task(&mut self, id: TaskId) -> TaskResult<()> {
        if self.store.retain(|task| task.id != id) == 0 {
            warn!("event=task_delete module=task_service status=not_found task_id={id}");
            return Err(TaskError::NotFound(id));
        }

        self.persist("task_delete", id)?;
        info!("event=task_delete module=task_service status=ok task_id={id}");
        Ok(())
    }

    /// Removes every completed task; returns how many were removed.
    pub fn clear_history(&mut self) -> TaskResult<usize> {
        let removed = self.store.retain(|task| !task.is_completed());
        self.store.save_all()?;
        info!("event=history_clear module=task_service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    /// Active tasks in display order.
    pub fn active_tasks(&self) -> Vec<&Task> {
        order_active(self.store.tasks())
    }

    /// Completed tasks, newest first.
    pub fn history(&self) -> Vec<&Task> {
        order_history(self.store.tasks())
    }

    fn persist(&mut self, event: &str, id: TaskId) -> TaskResult<()> {
        self.store.save_all().map_err(|err| {
            warn!("event={event} module=task_service status=not_durable task_id={id}");
            TaskError::from(err)
        })
    }
}
