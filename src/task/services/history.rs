//! Service layer for the task audit trail.

use super::{
    error::{TaskServiceError, TaskServiceResult},
    responses::HistoryEntry,
};
use crate::task::{
    domain::{Actor, HistoryRecord, TaskChanges, TaskId},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Records and reads task history.
#[derive(Clone)]
pub struct HistoryService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> HistoryService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new history service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Appends a record of `changes` made by `actor`.
    ///
    /// An empty change set writes nothing and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is absent and
    /// [`TaskServiceError::Repository`] when the write fails.
    #[instrument(skip(self, changes), fields(task_id = %task_id, actor = %actor.user_id()))]
    pub async fn record(
        &self,
        task_id: TaskId,
        actor: Actor,
        changes: TaskChanges,
    ) -> TaskServiceResult<Option<HistoryRecord>> {
        let Some(record) =
            HistoryRecord::from_changes(task_id, actor.user_id(), changes, &*self.clock)
        else {
            debug!("empty change set, nothing recorded");
            return Ok(None);
        };
        let stored = self.store.append(&record).await?;
        Ok(Some(stored))
    }

    /// Returns the audit trail of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is absent and
    /// [`TaskServiceError::Repository`] when a stored record cannot be read.
    pub async fn history_for_task(&self, task_id: TaskId) -> TaskServiceResult<Vec<HistoryEntry>> {
        if self.store.find_by_id(task_id).await?.is_none() {
            return Err(TaskServiceError::TaskNotFound(task_id));
        }
        let records = self.store.list_for_task(task_id).await?;
        Ok(records.into_iter().map(HistoryEntry::from).collect())
    }
}
