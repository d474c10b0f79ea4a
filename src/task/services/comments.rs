//! Service layer for task comments.

use super::{
    error::{TaskServiceError, TaskServiceResult},
    mutation::ensure_registered,
    responses::CommentResponse,
};
use crate::task::{
    domain::{Actor, Comment, CommentId, TaskId, is_owner},
    ports::TaskStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::instrument;

/// Comment orchestration service.
///
/// Any actor may comment on an existing task; only the author may edit or
/// delete a comment.
#[derive(Clone)]
pub struct CommentService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> CommentService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Adds a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::TaskNotFound`] when the task is absent
    /// and [`TaskServiceError::InvalidRequest`] for blank content.
    #[instrument(skip(self, content), fields(task_id = %task_id, actor = %actor.user_id()))]
    pub async fn create_comment(
        &self,
        task_id: TaskId,
        actor: Actor,
        content: &str,
    ) -> TaskServiceResult<CommentResponse> {
        ensure_registered(&*self.store, actor).await?;
        if self.store.find_by_id(task_id).await?.is_none() {
            return Err(TaskServiceError::TaskNotFound(task_id));
        }
        let comment = Comment::new(task_id, actor.user_id(), content, &*self.clock)?;
        let stored = self.store.store_comment(&comment).await?;
        Ok(stored.into())
    }

    /// Replaces the content of a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::CommentNotFound`] when the comment is
    /// absent, [`TaskServiceError::Forbidden`] when `actor` is not the author,
    /// and [`TaskServiceError::InvalidRequest`] for blank content.
    #[instrument(skip(self, content), fields(comment_id = %comment_id, actor = %actor.user_id()))]
    pub async fn update_comment(
        &self,
        comment_id: CommentId,
        actor: Actor,
        content: &str,
    ) -> TaskServiceResult<CommentResponse> {
        let mut comment = self.owned_comment(comment_id, actor, "update").await?;
        comment.edit(content, &*self.clock)?;
        let stored = self.store.update_comment(&comment).await?;
        Ok(stored.into())
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::CommentNotFound`] when the comment is
    /// absent and [`TaskServiceError::Forbidden`] when `actor` is not the
    /// author.
    #[instrument(skip(self), fields(comment_id = %comment_id, actor = %actor.user_id()))]
    pub async fn delete_comment(&self, comment_id: CommentId, actor: Actor) -> TaskServiceResult<()> {
        self.owned_comment(comment_id, actor, "delete").await?;
        self.store.delete_comment(comment_id).await?;
        Ok(())
    }

    /// Lists the comments of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is absent.
    pub async fn comments_for_task(&self, task_id: TaskId) -> TaskServiceResult<Vec<CommentResponse>> {
        if self.store.find_by_id(task_id).await?.is_none() {
            return Err(TaskServiceError::TaskNotFound(task_id));
        }
        let comments = self.store.comments_for_task(task_id).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    async fn owned_comment(
        &self,
        comment_id: CommentId,
        actor: Actor,
        action: &str,
    ) -> TaskServiceResult<Comment> {
        ensure_registered(&*self.store, actor).await?;
        let comment = self
            .store
            .find_comment(comment_id)
            .await?
            .ok_or(TaskServiceError::CommentNotFound(comment_id))?;
        if !is_owner(comment.created_by(), actor.user_id()) {
            return Err(TaskServiceError::forbidden(
                actor.user_id(),
                format!("{action} comment {comment_id}"),
            ));
        }
        Ok(comment)
    }
}
