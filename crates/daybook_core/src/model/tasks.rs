//! Task collection operations on a daily record.
//!
//! # Responsibility
//! - Insert/remove/toggle/reorder/batch-update task items.
//! - Keep `order` dense and `completed_at` consistent with `completed`.
//!
//! # Invariants
//! - Every mutation is a rejected no-op while the record is sealed.
//! - Validation failures leave the collection byte-for-byte unchanged.
//! - `completion_rate` is recomputed after every successful mutation.

use crate::model::content::is_valid_content;
use crate::model::metrics::completion_rate;
use crate::model::record::{DailyRecord, Priority, Task, TaskId};
use chrono::Utc;
use std::collections::HashSet;

impl DailyRecord {
    /// Appends a new open task at the end of the collection.
    ///
    /// # Contract
    /// - Rejects (returns `None`, collection unchanged) when the record is
    ///   sealed or `description` fails content validation.
    /// - On success trims the description, ranks the task at the tail and
    ///   returns its id.
    pub fn add_task(
        &mut self,
        description: &str,
        priority: Priority,
        tags: Vec<String>,
    ) -> Option<TaskId> {
        if self.is_sealed || !is_valid_content(description) {
            return None;
        }

        let task = Task::new(
            description.trim(),
            priority,
            tags,
            self.tasks.len() as u32,
        );
        let id = task.id;
        self.tasks.push(task);
        self.recompute_completion_rate();
        Some(id)
    }

    /// Removes one task and re-ranks the remainder dense and gapless.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        if self.is_sealed {
            return false;
        }
        let Some(position) = self.tasks.iter().position(|task| task.id == id) else {
            return false;
        };

        self.tasks.remove(position);
        self.reindex_task_orders();
        self.recompute_completion_rate();
        true
    }

    /// Flips one task's completion state.
    ///
    /// Stamps `completed_at` with the current time when turning complete
    /// and clears it when turning open, so two consecutive toggles restore
    /// both the flag and the null-ness of the stamp.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        if self.is_sealed {
            return false;
        }
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        task.completed = !task.completed;
        task.completed_at = task.completed.then(Utc::now);
        self.recompute_completion_rate();
        true
    }

    /// Re-ranks the collection to match `new_sequence` exactly.
    ///
    /// # Contract
    /// - `new_sequence` must be a full permutation of the current ids; any
    ///   size mismatch, unknown id or duplicate fails with no effect.
    /// - On success each task's `order` becomes its index in `new_sequence`
    ///   and the collection is stored in that order.
    pub fn reorder_tasks(&mut self, new_sequence: &[TaskId]) -> bool {
        if self.is_sealed || new_sequence.len() != self.tasks.len() {
            return false;
        }

        let current: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        let mut seen = HashSet::with_capacity(new_sequence.len());
        for id in new_sequence {
            if !current.contains(id) || !seen.insert(*id) {
                return false;
            }
        }

        for task in &mut self.tasks {
            // Position lookup cannot fail: both sides hold the same id set.
            let rank = new_sequence
                .iter()
                .position(|id| *id == task.id)
                .unwrap_or(usize::MAX);
            task.order = rank as u32;
        }
        self.tasks.sort_by_key(|task| task.order);
        true
    }

    /// Applies multiple completion-state updates in one pass.
    ///
    /// Unknown ids are skipped; `completion_rate` is recomputed once at the
    /// end instead of per item. Returns the number of tasks updated, `0`
    /// when sealed.
    pub fn batch_toggle(&mut self, updates: &[(TaskId, bool)]) -> usize {
        if self.is_sealed {
            return 0;
        }

        let mut applied = 0;
        for (id, completed) in updates {
            let Some(task) = self.tasks.iter_mut().find(|task| task.id == *id) else {
                continue;
            };
            task.completed = *completed;
            task.completed_at = completed.then(Utc::now);
            applied += 1;
        }

        if applied > 0 {
            self.recompute_completion_rate();
        }
        applied
    }

    pub(crate) fn recompute_completion_rate(&mut self) {
        self.completion_rate = completion_rate(&self.tasks);
    }

    fn reindex_task_orders(&mut self) {
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.order = index as u32;
        }
    }
}
