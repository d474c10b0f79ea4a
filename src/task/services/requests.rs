//! Request payloads accepted from the HTTP layer.
//!
//! Values arrive as raw strings; services validate and resolve them into
//! domain types.

use crate::task::domain::TaskDomainError;
use serde::Deserialize;

/// Proposed changes to a task.
///
/// Absent and empty fields leave the stored value untouched, except
/// `assignee`, where the empty string clears the assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedPayload`] for invalid JSON or
    /// wrongly typed fields.
    pub fn from_json(body: &str) -> Result<Self, TaskDomainError> {
        serde_json::from_str(body).map_err(|err| TaskDomainError::MalformedPayload(err.to_string()))
    }

    /// Sets the proposed title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the proposed description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the proposed status in its wire form (`IN_PROGRESS`).
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the proposed assignee id; the empty string clears it.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub(crate) fn into_parts(self) -> RawTaskFields {
        RawTaskFields {
            title: self.title,
            description: self.description,
            status: self.status,
            assignee: self.assignee,
        }
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            assignee: None,
        }
    }

    /// Parses a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MalformedPayload`] for invalid JSON, a
    /// missing title, or wrongly typed fields.
    pub fn from_json(body: &str) -> Result<Self, TaskDomainError> {
        serde_json::from_str(body).map_err(|err| TaskDomainError::MalformedPayload(err.to_string()))
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status in its wire form.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the initial assignee id.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub(crate) fn into_parts(self) -> RawTaskFields {
        RawTaskFields {
            title: Some(self.title),
            description: self.description,
            status: self.status,
            assignee: self.assignee,
        }
    }
}

/// Unvalidated task fields shared by create and update requests.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawTaskFields {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) assignee: Option<String>,
}
