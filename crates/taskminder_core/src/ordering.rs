//! Display ordering for task lists.
//!
//! # Invariants
//! - Active list: priority descending, then deadline ascending.
//! - Sorting is stable; equal keys keep insertion order.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Returns the active subset ordered by urgency.
pub fn order_active(tasks: &[Task]) -> Vec<&Task> {
    let mut active: Vec<&Task> = tasks.iter().filter(|task| task.is_active()).collect();
    // `sort_by_key` is a stable merge sort.
    active.sort_by_key(|task| (Reverse(task.priority), task.deadline));
    active
}

/// Returns the completed subset, most recently inserted first.
pub fn order_history(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().rev().filter(|task| task.is_completed()).collect()
}

/// Whether an active task's deadline has already passed at `now`.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    now > task.deadline
}

#[cfg(test)]
mod tests {
    use super::{is_overdue, order_active, order_history};
    use crate::model::task::{parse_deadline, Priority, Task, TaskDraft};

    fn task(id: i64, priority: Priority, deadline: &str) -> Task {
        let mut draft = TaskDraft::new(format!("task {id}"), parse_deadline(deadline).unwrap());
        draft.priority = Some(priority);
        draft.into_task(id).unwrap()
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|task| task.id).collect()
    }

    #[test]
    fn priority_first_then_soonest_deadline() {
        let tasks = vec![
            task(1, Priority::Normal, "2024-01-01T08:00"),
            task(2, Priority::Urgent, "2024-01-03T08:00"),
            task(3, Priority::Important, "2024-01-02T08:00"),
            task(4, Priority::Urgent, "2024-01-02T08:00"),
        ];
        assert_eq!(ids(&order_active(&tasks)), vec![4, 2, 3, 1]);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let tasks = vec![
            task(9, Priority::Important, "2024-01-01T08:00"),
            task(3, Priority::Important, "2024-01-01T08:00"),
            task(5, Priority::Important, "2024-01-01T08:00"),
        ];
        assert_eq!(ids(&order_active(&tasks)), vec![9, 3, 5]);
    }

    #[test]
    fn completed_tasks_move_to_history_newest_first() {
        let mut tasks = vec![
            task(1, Priority::Normal, "2024-01-01T08:00"),
            task(2, Priority::Normal, "2024-01-01T09:00"),
            task(3, Priority::Normal, "2024-01-01T10:00"),
        ];
        let done_at = parse_deadline("2024-01-02T00:00").unwrap();
        tasks[0].complete(done_at);
        tasks[2].complete(done_at);

        assert_eq!(ids(&order_active(&tasks)), vec![2]);
        assert_eq!(ids(&order_history(&tasks)), vec![3, 1]);
    }

    #[test]
    fn overdue_is_strictly_after_deadline() {
        let item = task(1, Priority::Normal, "2024-01-01T08:00");
        assert!(!is_overdue(&item, item.deadline));
        assert!(is_overdue(&item, parse_deadline("2024-01-01T08:01").unwrap()));
    }
}
