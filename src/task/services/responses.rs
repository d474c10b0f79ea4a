//! Response records returned to the HTTP layer.

use crate::task::{
    domain::{
        Comment, CommentId, HistoryId, HistoryRecord, Task, TaskChanges, TaskId, TaskStatus,
        UserId,
    },
    ports::{TaskRepositoryResult, UserRepository},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Task formatted for external consumers.
///
/// User references are rendered as email addresses, falling back to the
/// user id when the user record is missing. Storage keeps the ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// Assignee email, if assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Creator email.
    pub created_by: String,
    /// Most recent updater email.
    pub updated_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One formatted history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Record identifier.
    pub id: HistoryId,
    /// Audited task.
    pub task_id: TaskId,
    /// Actor that made the change.
    pub changed_by: UserId,
    /// Field changes.
    pub changes: TaskChanges,
    /// Time of the change.
    pub changed_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id(),
            task_id: record.task_id(),
            changed_by: record.changed_by(),
            changes: record.changes().clone(),
            changed_at: record.changed_at(),
        }
    }
}

/// One formatted comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentResponse {
    /// Comment identifier.
    pub id: CommentId,
    /// Comment body.
    pub content: String,
    /// Parent task.
    pub task_id: TaskId,
    /// Author.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id(),
            content: comment.content().to_owned(),
            task_id: comment.task_id(),
            created_by: comment.created_by(),
            created_at: comment.created_at(),
            updated_at: comment.updated_at(),
        }
    }
}

/// Task with its comments and audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetails {
    /// The formatted task.
    #[serde(flatten)]
    pub task: TaskResponse,
    /// Comments, oldest first.
    pub comments: Vec<CommentResponse>,
    /// History, oldest first.
    pub history: Vec<HistoryEntry>,
}

/// Resolves user ids to emails, caching lookups for one response.
pub(crate) struct EmailDirectory<'a, U: ?Sized> {
    users: &'a U,
    cache: HashMap<UserId, String>,
}

impl<'a, U> EmailDirectory<'a, U>
where
    U: UserRepository + ?Sized,
{
    pub(crate) fn new(users: &'a U) -> Self {
        Self {
            users,
            cache: HashMap::new(),
        }
    }

    async fn email_for(&mut self, id: UserId) -> TaskRepositoryResult<String> {
        if let Some(email) = self.cache.get(&id) {
            return Ok(email.clone());
        }
        let email = self
            .users
            .find_user(id)
            .await?
            .map_or_else(|| id.to_string(), |user| user.email().to_owned());
        self.cache.insert(id, email.clone());
        Ok(email)
    }

    pub(crate) async fn task_response(&mut self, task: &Task) -> TaskRepositoryResult<TaskResponse> {
        let assignee = match task.assignee() {
            Some(id) => Some(self.email_for(id).await?),
            None => None,
        };
        Ok(TaskResponse {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            assignee,
            created_by: self.email_for(task.created_by()).await?,
            updated_by: self.email_for(task.updated_by()).await?,
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        })
    }
}
