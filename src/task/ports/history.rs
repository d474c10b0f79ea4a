//! Append-only history port.

use super::TaskRepositoryResult;
use crate::task::domain::{HistoryRecord, TaskId};
use async_trait::async_trait;

/// Storage for task audit records.
///
/// The port exposes no update or delete: records are immutable once
/// written.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Appends a record and returns it as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`super::TaskRepositoryError::UserNotFound`] when the changer is
    /// not registered, [`super::TaskRepositoryError::Serialization`] when the
    /// changes cannot be encoded, or a persistence error when the write fails.
    async fn append(&self, record: &HistoryRecord) -> TaskRepositoryResult<HistoryRecord>;

    /// Lists the records of a task by `changed_at`, ties in append order.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::Serialization`] when a stored
    /// change set cannot be parsed; such records are never skipped.
    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<HistoryRecord>>;
}
