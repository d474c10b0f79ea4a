//! Pure planning of a task update and its audit record.

use super::{HistoryRecord, Task, TaskEdit, UserId, diff_task};
use mockable::Clock;

/// The writes produced by one task update.
///
/// Storage commits `history` (when present) before `task`, in the same
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdatePlan {
    /// Task state after the edit is applied.
    pub task: Task,
    /// Audit record, absent when no tracked field changed.
    pub history: Option<HistoryRecord>,
}

impl TaskUpdatePlan {
    /// Diffs `current` against `edit` and applies the edit on behalf of
    /// `actor`.
    #[must_use]
    pub fn compute(current: &Task, edit: &TaskEdit, actor: UserId, clock: &impl Clock) -> Self {
        let changes = diff_task(current, edit);
        let history = HistoryRecord::from_changes(current.id(), actor, changes, clock);

        let mut task = current.clone();
        task.apply_edit(edit, actor, clock);

        Self { task, history }
    }

    /// Returns `true` when the update will be audited.
    #[must_use]
    pub const fn is_audited(&self) -> bool {
        self.history.is_some()
    }
}
