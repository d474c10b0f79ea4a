//! Field-level change tracking for task updates.
//!
//! [`diff_task`] compares a stored task with an effective edit and yields a
//! [`TaskChanges`] map. A non-empty map becomes an immutable
//! [`HistoryRecord`]; an empty map means the update is not audited.

use super::{
    AssigneeUpdate, ChangeSerializationError, HistoryId, Task, TaskEdit, TaskId, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task fields whose changes are recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    /// The task title.
    Title,
    /// The task description.
    Description,
    /// The task status.
    Status,
    /// The task assignee.
    Assignee,
}

impl TrackedField {
    /// Returns the key used in serialized change sets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::Assignee => "assignee",
        }
    }
}

/// Before and after textual values of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value stored before the update.
    pub from: String,
    /// Value applied by the update.
    pub to: String,
}

impl FieldChange {
    /// Creates a field change.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Mapping of field name to its before/after values.
///
/// Keys are kept sorted so serialized output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskChanges(BTreeMap<String, FieldChange>);

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change for `field`.
    pub fn insert(&mut self, field: TrackedField, change: FieldChange) {
        self.0.insert(field.as_str().to_owned(), change);
    }

    /// Returns the change recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: TrackedField) -> Option<&FieldChange> {
        self.0.get(field.as_str())
    }

    /// Returns `true` when no field changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(field, change)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.0.iter().map(|(field, change)| (field.as_str(), change))
    }

    /// Serializes the change set to the stored JSON text form.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeSerializationError`] if encoding fails.
    pub fn to_json(&self) -> Result<String, ChangeSerializationError> {
        serde_json::to_string(self).map_err(|err| ChangeSerializationError::serialize(&err))
    }

    /// Parses a change set from its stored JSON text form.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeSerializationError`] if the text is not a valid
    /// `{field: {from, to}}` mapping.
    pub fn from_json(text: &str) -> Result<Self, ChangeSerializationError> {
        serde_json::from_str(text).map_err(|err| ChangeSerializationError::parse(&err))
    }
}

/// Computes the field-level changes an edit would make to `task`.
///
/// Title, description and status are compared only when the edit carries a
/// value. The assignee is compared whenever the edit touches it, with an
/// unassigned task rendered as the empty string.
#[must_use]
pub fn diff_task(task: &Task, edit: &TaskEdit) -> TaskChanges {
    let mut changes = TaskChanges::new();

    if let Some(title) = edit.title() {
        record_if_changed(&mut changes, TrackedField::Title, task.title(), title);
    }
    if let Some(description) = edit.description() {
        record_if_changed(
            &mut changes,
            TrackedField::Description,
            task.description(),
            description,
        );
    }
    if let Some(status) = edit.status() {
        record_if_changed(
            &mut changes,
            TrackedField::Status,
            task.status().as_str(),
            status.as_str(),
        );
    }

    let proposed_assignee = match edit.assignee() {
        AssigneeUpdate::Unchanged => None,
        AssigneeUpdate::Clear => Some(String::new()),
        AssigneeUpdate::Assign(user_id) => Some(user_id.to_string()),
    };
    if let Some(proposed) = proposed_assignee {
        let current = task.assignee().map(|id| id.to_string()).unwrap_or_default();
        record_if_changed(&mut changes, TrackedField::Assignee, &current, &proposed);
    }

    changes
}

fn record_if_changed(changes: &mut TaskChanges, field: TrackedField, from: &str, to: &str) {
    if from != to {
        changes.insert(field, FieldChange::new(from, to));
    }
}

/// Immutable audit entry describing one task update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    id: HistoryId,
    task_id: TaskId,
    changed_by: UserId,
    changes: TaskChanges,
    changed_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Persisted record identifier.
    pub id: HistoryId,
    /// Task the record belongs to.
    pub task_id: TaskId,
    /// Actor that made the change.
    pub changed_by: UserId,
    /// Parsed change set.
    pub changes: TaskChanges,
    /// Time of the change.
    pub changed_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Builds a record for a change set.
    ///
    /// Returns `None` for an empty change set: no-op updates are never
    /// audited.
    #[must_use]
    pub fn from_changes(
        task_id: TaskId,
        changed_by: UserId,
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }
        Some(Self {
            id: HistoryId::new(),
            task_id,
            changed_by,
            changes,
            changed_at: clock.utc(),
        })
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            changed_by: data.changed_by,
            changes: data.changes,
            changed_at: data.changed_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryId {
        self.id
    }

    /// Returns the audited task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the actor that made the change.
    #[must_use]
    pub const fn changed_by(&self) -> UserId {
        self.changed_by
    }

    /// Returns the recorded field changes.
    #[must_use]
    pub const fn changes(&self) -> &TaskChanges {
        &self.changes
    }

    /// Returns the change timestamp.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}
