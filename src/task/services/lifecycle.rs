//! Service layer for task creation, retrieval, listing, and deletion.

use super::{
    error::{TaskServiceError, TaskServiceResult},
    mutation::{ensure_registered, resolve_edit},
    requests::CreateTaskRequest,
    responses::{CommentResponse, EmailDirectory, HistoryEntry, TaskDetails, TaskResponse},
};
use crate::task::{
    domain::{Actor, AssigneeUpdate, NewTask, Task, TaskId, is_owner, validate_title},
    ports::{TaskFilter, TaskStore},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument};

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task owned by `actor`.
    ///
    /// The status defaults to `TODO`; a given status and assignee are
    /// validated like an update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::InvalidRequest`] for a blank title, an
    /// unknown status or an unknown assignee, and
    /// [`TaskServiceError::Repository`] when storage fails.
    #[instrument(skip(self, request), fields(actor = %actor.user_id()))]
    pub async fn create_task(
        &self,
        actor: Actor,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<TaskResponse> {
        ensure_registered(&*self.store, actor).await?;
        let fields = request.into_parts();
        let title = fields.title.clone().unwrap_or_default();
        validate_title(&title)?;
        let edit = resolve_edit(&*self.store, fields).await?;

        let assignee = match edit.assignee() {
            AssigneeUpdate::Assign(user_id) => Some(user_id),
            AssigneeUpdate::Unchanged | AssigneeUpdate::Clear => None,
        };
        let new_task = NewTask {
            title,
            description: edit.description().unwrap_or_default().to_owned(),
            status: edit.status().unwrap_or_default(),
            assignee,
        };
        let task = Task::new(new_task, actor.user_id(), &*self.clock)?;
        let stored = self.store.store(&task).await?;
        info!(task_id = %stored.id(), "task created");

        let mut directory = EmailDirectory::new(&*self.store);
        Ok(directory.task_response(&stored).await?)
    }

    /// Retrieves a task with its comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is absent and
    /// [`TaskServiceError::Repository`] when storage fails, including a
    /// history record that cannot be parsed.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn get_task(&self, task_id: TaskId) -> TaskServiceResult<TaskDetails> {
        let task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        let comments = self.store.comments_for_task(task_id).await?;
        let history = self.store.list_for_task(task_id).await?;

        let mut directory = EmailDirectory::new(&*self.store);
        Ok(TaskDetails {
            task: directory.task_response(&task).await?,
            comments: comments.into_iter().map(CommentResponse::from).collect(),
            history: history.into_iter().map(HistoryEntry::from).collect(),
        })
    }

    /// Lists tasks matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when storage fails.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> TaskServiceResult<Vec<TaskResponse>> {
        let tasks = self.store.find_matching(filter).await?;
        let mut directory = EmailDirectory::new(&*self.store);
        let mut responses = Vec::with_capacity(tasks.len());
        for task in &tasks {
            responses.push(directory.task_response(task).await?);
        }
        Ok(responses)
    }

    /// Deletes a task with its comments and history.
    ///
    /// Only the task's creator may delete it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::TaskNotFound`] when the task is absent,
    /// [`TaskServiceError::Forbidden`] when `actor` is not the creator, and
    /// [`TaskServiceError::Repository`] when storage fails.
    #[instrument(skip(self), fields(task_id = %task_id, actor = %actor.user_id()))]
    pub async fn delete_task(&self, task_id: TaskId, actor: Actor) -> TaskServiceResult<()> {
        ensure_registered(&*self.store, actor).await?;
        let task = self
            .store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        if !is_owner(task.created_by(), actor.user_id()) {
            return Err(TaskServiceError::forbidden(
                actor.user_id(),
                format!("delete task {task_id}"),
            ));
        }
        self.store.delete_cascade(task_id).await?;
        info!("task deleted");
        Ok(())
    }
}
