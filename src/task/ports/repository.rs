//! Repository port for task persistence, lookup, atomic update and deletion.

use crate::task::domain::{
    ChangeSerializationError, CommentId, HistoryId, Task, TaskId, TaskStatus, TaskUpdatePlan,
    UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Optional predicates for listing tasks. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact status match.
    pub status: Option<TaskStatus>,
    /// Exact creator match.
    pub created_by: Option<UserId>,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to tasks created by one user.
    #[must_use]
    pub const fn with_created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }

    /// Restricts results to titles containing `fragment`.
    #[must_use]
    pub fn with_title_contains(mut self, fragment: impl Into<String>) -> Self {
        self.title_contains = Some(fragment.into());
        self
    }

    /// Returns `true` when `task` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        let creator_matches = self
            .created_by
            .is_none_or(|creator| task.created_by() == creator);
        let title_matches = self.title_contains.as_deref().is_none_or(|fragment| {
            task.title()
                .to_lowercase()
                .contains(&fragment.to_lowercase())
        });
        status_matches && creator_matches && title_matches
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and returns it as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists and [`TaskRepositoryError::UserNotFound`] when the creator or
    /// assignee is not a registered user.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns tasks matching `filter`, oldest first.
    async fn find_matching(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>>;

    /// Reads the task, plans an update from it, and commits the plan.
    ///
    /// The read, the history insert and the task write happen in one
    /// transaction scoped to the task row, so concurrent updates of the same
    /// task serialize. The history record (if any) is written before the
    /// task. Returns the committed plan with the task and history record as
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::UserNotFound`] when the updater or
    /// assignee is not a registered user, or a persistence/serialization
    /// error when either write fails; in every case nothing is committed.
    async fn update_with<F>(&self, id: TaskId, plan: F) -> TaskRepositoryResult<TaskUpdatePlan>
    where
        F: FnOnce(&Task) -> TaskUpdatePlan + Send + 'static;

    /// Deletes a task together with its comments and history records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete_cascade(&self, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A user with the same identifier or email already exists.
    #[error("duplicate user: {0}")]
    DuplicateUser(String),

    /// A comment with the same identifier already exists.
    #[error("duplicate comment identifier: {0}")]
    DuplicateComment(CommentId),

    /// A history record with the same identifier already exists.
    #[error("duplicate history identifier: {0}")]
    DuplicateHistory(HistoryId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The comment was not found.
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),

    /// A history change set could not be encoded or decoded.
    #[error(transparent)]
    Serialization(#[from] ChangeSerializationError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
