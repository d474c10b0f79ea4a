//! Task update pipeline with field-level history tracking.

use super::{
    error::{TaskServiceError, TaskServiceResult},
    requests::{RawTaskFields, UpdateTaskRequest},
    responses::{EmailDirectory, TaskResponse},
};
use crate::task::{
    domain::{
        Actor, AssigneeUpdate, TaskDomainError, TaskEdit, TaskId, TaskUpdatePlan, parse_assignee,
        validate_status,
    },
    ports::{TaskStore, UserRepository},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Applies task updates and records their audit trail.
///
/// Each update runs in a fixed order: fetch, parse, validate status,
/// resolve assignee, then diff, write history and write the task inside one
/// storage transaction. Any failure returns before anything is committed.
/// Updates are not ownership-gated: any authenticated actor may edit any
/// task.
#[derive(Clone)]
pub struct TaskMutationService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskMutationService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task mutation service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Updates a task from a typed request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::UserNotFound`] when `actor` is not
    /// registered, [`TaskServiceError::TaskNotFound`] when the task is absent,
    /// [`TaskServiceError::InvalidRequest`] for an unknown status or
    /// assignee, and [`TaskServiceError::Repository`] when storage fails.
    #[instrument(skip(self, request), fields(task_id = %task_id, actor = %actor.user_id()))]
    pub async fn update_task(
        &self,
        task_id: TaskId,
        actor: Actor,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<TaskResponse> {
        self.execute(task_id, actor, || Ok(request)).await
    }

    /// Updates a task from a raw JSON body.
    ///
    /// The body is parsed after the task has been fetched, so a missing task
    /// is reported as not found even when the body is malformed.
    ///
    /// # Errors
    ///
    /// As [`Self::update_task`], plus
    /// [`TaskDomainError::MalformedPayload`] for an unparseable body.
    #[instrument(skip(self, body), fields(task_id = %task_id, actor = %actor.user_id()))]
    pub async fn update_task_from_json(
        &self,
        task_id: TaskId,
        actor: Actor,
        body: &str,
    ) -> TaskServiceResult<TaskResponse> {
        self.execute(task_id, actor, || UpdateTaskRequest::from_json(body))
            .await
    }

    async fn execute<P>(
        &self,
        task_id: TaskId,
        actor: Actor,
        parse: P,
    ) -> TaskServiceResult<TaskResponse>
    where
        P: FnOnce() -> Result<UpdateTaskRequest, TaskDomainError> + Send,
    {
        let outcome = self.run_pipeline(task_id, actor, parse).await;
        if let Err(err) = &outcome {
            warn!(kind = ?err.kind(), error = %err, "task update rejected");
        }
        outcome
    }

    async fn run_pipeline<P>(
        &self,
        task_id: TaskId,
        actor: Actor,
        parse: P,
    ) -> TaskServiceResult<TaskResponse>
    where
        P: FnOnce() -> Result<UpdateTaskRequest, TaskDomainError> + Send,
    {
        ensure_registered(&*self.store, actor).await?;
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;

        let request = parse()?;
        let edit = resolve_edit(&*self.store, request.into_parts()).await?;

        let clock = Arc::clone(&self.clock);
        let author = actor.user_id();
        let committed = self
            .store
            .update_with(task_id, move |current| {
                TaskUpdatePlan::compute(current, &edit, author, &*clock)
            })
            .await?;

        match committed.history.as_ref() {
            Some(record) => debug!(
                history_id = %record.id(),
                changed_fields = record.changes().len(),
                "task history recorded"
            ),
            None => debug!("no tracked field changed, history skipped"),
        }

        let mut directory = EmailDirectory::new(&*self.store);
        Ok(directory.task_response(&committed.task).await?)
    }
}

/// Checks that `actor` names a registered user.
pub(super) async fn ensure_registered<U>(users: &U, actor: Actor) -> TaskServiceResult<()>
where
    U: UserRepository + ?Sized,
{
    if users.find_user(actor.user_id()).await?.is_none() {
        return Err(TaskServiceError::UserNotFound(actor.user_id()));
    }
    Ok(())
}

/// Validates raw fields and resolves them into an effective edit.
pub(super) async fn resolve_edit<U>(users: &U, fields: RawTaskFields) -> TaskServiceResult<TaskEdit>
where
    U: UserRepository + ?Sized,
{
    let mut edit = TaskEdit::new();
    if let Some(title) = fields.title {
        edit = edit.with_title(title);
    }
    if let Some(description) = fields.description {
        edit = edit.with_description(description);
    }
    if let Some(status) = fields.status.filter(|raw| !raw.is_empty()) {
        edit = edit.with_status(validate_status(&status)?);
    }
    if let Some(assignee) = fields.assignee {
        edit = edit.with_assignee(resolve_assignee(users, &assignee).await?);
    }
    Ok(edit)
}

/// Resolves a requested assignee against the user collection.
///
/// A missing user is a validation failure, not a not-found error: the task
/// being edited exists.
pub(super) async fn resolve_assignee<U>(users: &U, raw: &str) -> TaskServiceResult<AssigneeUpdate>
where
    U: UserRepository + ?Sized,
{
    let Some(user_id) = parse_assignee(raw)? else {
        return Ok(AssigneeUpdate::Clear);
    };
    if users.find_user(user_id).await?.is_none() {
        return Err(TaskDomainError::unknown_assignee(user_id).into());
    }
    Ok(AssigneeUpdate::Assign(user_id))
}
