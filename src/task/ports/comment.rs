//! Comment persistence port.

use super::TaskRepositoryResult;
use crate::task::domain::{Comment, CommentId, TaskId};
use async_trait::async_trait;

/// Storage for task comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a new comment and returns it as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::NotFound`] when the parent task
    /// does not exist, [`super::TaskRepositoryError::UserNotFound`] when the
    /// author is not registered, or
    /// [`super::TaskRepositoryError::DuplicateComment`] when the ID is taken.
    async fn store_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment>;

    /// Persists an edited comment and returns it as persisted.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::CommentNotFound`] when the
    /// comment does not exist.
    async fn update_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment>;

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::CommentNotFound`] when the
    /// comment does not exist.
    async fn delete_comment(&self, id: CommentId) -> TaskRepositoryResult<()>;

    /// Finds a comment by identifier.
    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<Comment>>;

    /// Lists the comments of a task, oldest first.
    async fn comments_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>>;
}
