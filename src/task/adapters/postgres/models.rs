//! Diesel row models for task management persistence.

use super::schema::{comments, task_histories, tasks, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Workflow status.
    pub status: String,
    /// Optional assignee.
    pub assignee: Option<uuid::Uuid>,
    /// Creator of the task.
    pub created_by: uuid::Uuid,
    /// Most recent updater.
    pub updated_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Workflow status.
    pub status: String,
    /// Optional assignee.
    pub assignee: Option<uuid::Uuid>,
    /// Creator of the task.
    pub created_by: uuid::Uuid,
    /// Most recent updater.
    pub updated_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable task columns written by an update.
///
/// A cleared assignee is written as `NULL` rather than skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Workflow status.
    pub status: String,
    /// Optional assignee.
    pub assignee: Option<uuid::Uuid>,
    /// Most recent updater.
    pub updated_by: uuid::Uuid,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Email address.
    pub email: String,
    /// Authorization role.
    pub role: String,
}

/// Query and insert row for comments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: uuid::Uuid,
    /// Parent task.
    pub task_id: uuid::Uuid,
    /// Comment body.
    pub content: String,
    /// Author.
    pub created_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for history records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_histories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Audited task.
    pub task_id: uuid::Uuid,
    /// Actor that made the change.
    pub changed_by: uuid::Uuid,
    /// Serialized change set.
    pub changes: String,
    /// Time of the change.
    pub changed_at: DateTime<Utc>,
}
