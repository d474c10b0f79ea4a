//! Comments attached to tasks.

use super::{CommentId, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A comment on a task. Only its creator may edit or delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    task_id: TaskId,
    content: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Parent task.
    pub task_id: TaskId,
    /// Comment body.
    pub content: String,
    /// Author of the comment.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment on `task_id` written by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] if the content is blank.
    pub fn new(
        task_id: TaskId,
        author: UserId,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let body = validate_content(content.into())?;
        let timestamp = clock.utc();
        Ok(Self {
            id: CommentId::new(),
            task_id,
            content: body,
            created_by: author,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            content: data.content,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the comment body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the author.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the comment body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] if the content is blank.
    pub fn edit(
        &mut self,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.content = validate_content(content.into())?;
        self.updated_at = clock.utc();
        Ok(())
    }
}

fn validate_content(content: String) -> Result<String, TaskDomainError> {
    if content.trim().is_empty() {
        return Err(TaskDomainError::EmptyComment);
    }
    Ok(content)
}
