//! Service boundary errors for task operations.

use crate::task::{
    domain::{CommentId, TaskDomainError, TaskId, UserId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced task, comment or user does not exist.
    NotFound,
    /// The payload is malformed or fails validation.
    InvalidRequest,
    /// The actor does not own the resource.
    Forbidden,
    /// Storage or serialization failed.
    Internal,
}

/// Errors returned by task services.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The comment does not exist.
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),

    /// The acting or referenced user is not registered.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The request failed validation.
    #[error(transparent)]
    InvalidRequest(#[from] TaskDomainError),

    /// The actor is not the owner of the resource.
    #[error("user {actor} is not allowed to {action}")]
    Forbidden {
        /// Acting user.
        actor: UserId,
        /// Attempted action, e.g. `delete task 1234`.
        action: String,
    },

    /// Storage failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl TaskServiceError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound(_) | Self::CommentNotFound(_) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Repository(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn forbidden(actor: UserId, action: impl Into<String>) -> Self {
        Self::Forbidden {
            actor,
            action: action.into(),
        }
    }
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::TaskNotFound(id),
            TaskRepositoryError::CommentNotFound(id) => Self::CommentNotFound(id),
            TaskRepositoryError::UserNotFound(id) => Self::UserNotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
