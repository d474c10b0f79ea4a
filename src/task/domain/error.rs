//! Error types for task domain validation and parsing.

use super::UserId;
use thiserror::Error;

/// Errors returned while validating task, comment, and actor input.
///
/// Every variant describes a request the caller can fix; none of them
/// indicate a storage failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The request payload could not be parsed.
    #[error("malformed request payload: {0}")]
    MalformedPayload(String),

    /// The status is not one of the supported task statuses.
    #[error("invalid status '{0}', expected one of TODO, IN_PROGRESS, IN_REVIEW, DONE, ARCHIVE")]
    InvalidStatus(String),

    /// The assignee does not reference an existing user.
    #[error("assignee '{0}' does not reference an existing user")]
    UnknownAssignee(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The comment content is empty after trimming.
    #[error("comment content must not be empty")]
    EmptyComment,

    /// The user email is empty after trimming.
    #[error("user email must not be empty")]
    EmptyEmail,

    /// The actor subject is not a valid user identifier.
    #[error("invalid actor subject '{0}'")]
    InvalidActor(String),
}

impl TaskDomainError {
    /// Creates an unknown-assignee error for a resolved identifier.
    #[must_use]
    pub fn unknown_assignee(id: UserId) -> Self {
        Self::UnknownAssignee(id.to_string())
    }
}

/// Error returned while parsing task statuses from requests or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl From<ParseTaskStatusError> for TaskDomainError {
    fn from(err: ParseTaskStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}

/// Error returned while parsing user roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);

/// Error returned when a history change set cannot be serialized or parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("history changes could not be {operation}: {reason}")]
pub struct ChangeSerializationError {
    /// Either `serialized` or `parsed`.
    pub operation: &'static str,
    /// Underlying codec message.
    pub reason: String,
}

impl ChangeSerializationError {
    pub(crate) fn serialize(err: &serde_json::Error) -> Self {
        Self {
            operation: "serialized",
            reason: err.to_string(),
        }
    }

    pub(crate) fn parse(err: &serde_json::Error) -> Self {
        Self {
            operation: "parsed",
            reason: err.to_string(),
        }
    }
}
