//! Pure view projections over the task collection.
//!
//! Nothing here holds state: every function derives its result from
//! `(tasks, filter)` and nothing else.

use serde::Serialize;

use crate::task::{Filter, Task};

/// The subset of tasks the active filter passes, in collection order.
pub fn filtered<'a>(tasks: &'a [Task], filter: Filter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

pub fn counts(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskCounts {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

impl TaskCounts {
    /// Completion ratio, undefined for an empty collection.
    ///
    /// Proportional rendering (progress bars) uses this unrounded value.
    pub fn progress(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.completed as f64 / self.total as f64)
        }
    }

    /// Whole-number percentage for label text, rounded to nearest.
    pub fn progress_percent(&self) -> Option<u32> {
        self.progress().map(|ratio| (ratio * 100.0).round() as u32)
    }
}
