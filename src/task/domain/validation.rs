//! Pure validation rules for task requests.
//!
//! Rules that need storage (assignee existence) are completed by the
//! service layer; the functions here only check shape.

use super::{TaskDomainError, TaskStatus, UserId};

/// Validates a requested status against the supported set.
///
/// Matching is exact: `"done"` and `" DONE"` are rejected.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidStatus`] for any other value.
pub fn validate_status(raw: &str) -> Result<TaskStatus, TaskDomainError> {
    Ok(TaskStatus::try_from(raw)?)
}

/// Parses a requested assignee.
///
/// The empty string clears the assignee and yields `Ok(None)`. Any other
/// value must be a user identifier; whether that user exists is checked by
/// the caller.
///
/// # Errors
///
/// Returns [`TaskDomainError::UnknownAssignee`] when the value cannot name a
/// user.
pub fn parse_assignee(raw: &str) -> Result<Option<UserId>, TaskDomainError> {
    if raw.is_empty() {
        return Ok(None);
    }
    UserId::parse(raw)
        .map(Some)
        .ok_or_else(|| TaskDomainError::UnknownAssignee(raw.to_owned()))
}

/// Validates a title for a new task.
///
/// # Errors
///
/// Returns [`TaskDomainError::EmptyTitle`] if the title is blank.
pub fn validate_title(raw: &str) -> Result<(), TaskDomainError> {
    if raw.trim().is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(())
}
