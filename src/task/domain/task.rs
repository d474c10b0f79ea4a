//! Task aggregate root, status enumeration, and the effective update payload.

use super::{ParseTaskStatusError, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task workflow status.
///
/// The wire and storage form is the upper-case snake name (`IN_PROGRESS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    Todo,
    /// Work is underway.
    InProgress,
    /// Work is awaiting review.
    InReview,
    /// Work is complete.
    Done,
    /// Task is archived and hidden from active boards.
    Archive,
}

impl TaskStatus {
    /// Every supported status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::InProgress,
        Self::InReview,
        Self::Done,
        Self::Archive,
    ];

    /// Returns the canonical wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Done => "DONE",
            Self::Archive => "ARCHIVE",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an update affects the task assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssigneeUpdate {
    /// The assignee is left as stored.
    #[default]
    Unchanged,
    /// The assignee is cleared (stored as null).
    Clear,
    /// The task is assigned to an existing user.
    Assign(UserId),
}

/// Effective update payload after validation and assignee resolution.
///
/// Empty title and description values are normalized to "not present" on
/// construction, so an edit never blanks those fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskEdit {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    assignee: AssigneeUpdate,
}

impl TaskEdit {
    /// Creates an edit that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the proposed title; empty values are ignored.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// Sets the proposed description; empty values are ignored.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Sets the proposed status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the proposed assignee change.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: AssigneeUpdate) -> Self {
        self.assignee = assignee;
        self
    }

    /// Returns the proposed title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the proposed description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the proposed status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the proposed assignee change.
    #[must_use]
    pub const fn assignee(&self) -> AssigneeUpdate {
        self.assignee
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title; must not be blank.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Initial status.
    pub status: TaskStatus,
    /// Initial assignee, already resolved to an existing user.
    pub assignee: Option<UserId>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    assignee: Option<UserId>,
    created_by: UserId,
    updated_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted assignee, if any.
    pub assignee: Option<UserId>,
    /// Creator of the task.
    pub created_by: UserId,
    /// Most recent updater of the task.
    pub updated_by: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task owned by `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        new_task: NewTask,
        creator: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        if new_task.title.trim().is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            assignee: new_task.assignee,
            created_by: creator,
            updated_by: creator,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            assignee: data.assignee,
            created_by: data.created_by,
            updated_by: data.updated_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creator (owner) of the task.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the most recent updater.
    #[must_use]
    pub const fn updated_by(&self) -> UserId {
        self.updated_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies an effective edit on behalf of `actor`.
    ///
    /// Only fields present in the edit are overwritten. The updater and
    /// update timestamp always change, even when no field differs.
    pub fn apply_edit(&mut self, edit: &TaskEdit, actor: UserId, clock: &impl Clock) {
        if let Some(title) = edit.title() {
            title.clone_into(&mut self.title);
        }
        if let Some(description) = edit.description() {
            description.clone_into(&mut self.description);
        }
        if let Some(status) = edit.status() {
            self.status = status;
        }
        match edit.assignee() {
            AssigneeUpdate::Unchanged => {}
            AssigneeUpdate::Clear => self.assignee = None,
            AssigneeUpdate::Assign(user_id) => self.assignee = Some(user_id),
        }
        self.updated_by = actor;
        self.updated_at = clock.utc();
    }
}
