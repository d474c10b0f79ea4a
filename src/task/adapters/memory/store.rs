//! In-memory task store for tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        Comment, CommentId, HistoryId, HistoryRecord, PersistedHistoryData, Task, TaskChanges,
        TaskId, TaskUpdatePlan, User, UserId,
    },
    ports::{
        CommentRepository, HistoryRepository, TaskFilter, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult, UserRepository,
    },
};

/// Thread-safe in-memory store implementing every task port.
///
/// One lock guards all collections, so an update and its history record are
/// committed together or not at all. User references on tasks, comments and
/// history must name registered users, as the database foreign keys demand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    task_order: Vec<TaskId>,
    users: HashMap<UserId, User>,
    comments: Vec<Comment>,
    history: Vec<StoredHistory>,
}

/// History row as persisted, with the change set kept as serialized text.
#[derive(Debug, Clone)]
struct StoredHistory {
    id: HistoryId,
    task_id: TaskId,
    changed_by: UserId,
    changes: String,
    changed_at: DateTime<Utc>,
}

impl StoredHistory {
    fn encode(record: &HistoryRecord) -> TaskRepositoryResult<Self> {
        Ok(Self {
            id: record.id(),
            task_id: record.task_id(),
            changed_by: record.changed_by(),
            changes: record.changes().to_json()?,
            changed_at: record.changed_at(),
        })
    }

    fn decode(&self) -> TaskRepositoryResult<HistoryRecord> {
        let changes = TaskChanges::from_json(&self.changes)?;
        Ok(HistoryRecord::from_persisted(PersistedHistoryData {
            id: self.id,
            task_id: self.task_id,
            changed_by: self.changed_by,
            changes,
            changed_at: self.changed_at,
        }))
    }
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    /// Inserts a history row with an arbitrary serialized change set.
    #[cfg(test)]
    pub(crate) fn insert_raw_history(
        &self,
        task_id: TaskId,
        changed_by: UserId,
        changes: &str,
        changed_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.history.push(StoredHistory {
            id: HistoryId::new(),
            task_id,
            changed_by,
            changes: changes.to_owned(),
            changed_at,
        });
        Ok(())
    }
}

fn require_user(state: &InMemoryTaskState, id: UserId) -> TaskRepositoryResult<()> {
    if state.users.contains_key(&id) {
        Ok(())
    } else {
        Err(TaskRepositoryError::UserNotFound(id))
    }
}

fn require_task_users(state: &InMemoryTaskState, task: &Task) -> TaskRepositoryResult<()> {
    require_user(state, task.created_by())?;
    require_user(state, task.updated_by())?;
    task.assignee()
        .map_or(Ok(()), |assignee| require_user(state, assignee))
}

fn push_history(state: &mut InMemoryTaskState, row: StoredHistory) -> TaskRepositoryResult<()> {
    if state.history.iter().any(|existing| existing.id == row.id) {
        return Err(TaskRepositoryError::DuplicateHistory(row.id));
    }
    state.history.push(row);
    Ok(())
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        require_task_users(&state, task)?;
        state.task_order.push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_matching(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .task_order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(Task::created_at);
        Ok(tasks)
    }

    async fn update_with<F>(&self, id: TaskId, plan: F) -> TaskRepositoryResult<TaskUpdatePlan>
    where
        F: FnOnce(&Task) -> TaskUpdatePlan + Send + 'static,
    {
        let mut state = self.write()?;
        let current = state
            .tasks
            .get(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        let planned = plan(current);
        require_task_users(&state, &planned.task)?;
        if let Some(record) = planned.history.as_ref() {
            require_user(&state, record.changed_by())?;
        }

        // Encode before touching state so a failure leaves nothing behind.
        let history_row = planned
            .history
            .as_ref()
            .map(StoredHistory::encode)
            .transpose()?;
        if let Some(row) = history_row {
            push_history(&mut state, row)?;
        }
        state.tasks.insert(id, planned.task.clone());
        Ok(planned)
    }

    async fn delete_cascade(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskRepositoryError::NotFound(id));
        }
        state.task_order.retain(|task_id| *task_id != id);
        state.comments.retain(|comment| comment.task_id() != id);
        state.history.retain(|row| row.task_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryTaskStore {
    async fn store_user(&self, user: &User) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id()) {
            return Err(TaskRepositoryError::DuplicateUser(user.id().to_string()));
        }
        if state
            .users
            .values()
            .any(|existing| existing.email() == user.email())
        {
            return Err(TaskRepositoryError::DuplicateUser(user.email().to_owned()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> TaskRepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryTaskStore {
    async fn append(&self, record: &HistoryRecord) -> TaskRepositoryResult<HistoryRecord> {
        let row = StoredHistory::encode(record)?;
        let mut state = self.write()?;
        if !state.tasks.contains_key(&record.task_id()) {
            return Err(TaskRepositoryError::NotFound(record.task_id()));
        }
        require_user(&state, record.changed_by())?;
        push_history(&mut state, row)?;
        Ok(record.clone())
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<HistoryRecord>> {
        let state = self.read()?;
        let mut records = state
            .history
            .iter()
            .filter(|row| row.task_id == task_id)
            .map(StoredHistory::decode)
            .collect::<TaskRepositoryResult<Vec<_>>>()?;
        records.sort_by_key(HistoryRecord::changed_at);
        Ok(records)
    }
}

#[async_trait]
impl CommentRepository for InMemoryTaskStore {
    async fn store_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&comment.task_id()) {
            return Err(TaskRepositoryError::NotFound(comment.task_id()));
        }
        require_user(&state, comment.created_by())?;
        if state.comments.iter().any(|c| c.id() == comment.id()) {
            return Err(TaskRepositoryError::DuplicateComment(comment.id()));
        }
        state.comments.push(comment.clone());
        Ok(comment.clone())
    }

    async fn update_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment> {
        let mut state = self.write()?;
        let slot = state
            .comments
            .iter_mut()
            .find(|c| c.id() == comment.id())
            .ok_or(TaskRepositoryError::CommentNotFound(comment.id()))?;
        *slot = comment.clone();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: CommentId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let before = state.comments.len();
        state.comments.retain(|comment| comment.id() != id);
        if state.comments.len() == before {
            return Err(TaskRepositoryError::CommentNotFound(id));
        }
        Ok(())
    }

    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<Comment>> {
        let state = self.read()?;
        Ok(state.comments.iter().find(|c| c.id() == id).cloned())
    }

    async fn comments_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>> {
        let state = self.read()?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|comment| comment.task_id() == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(Comment::created_at);
        Ok(comments)
    }
}
