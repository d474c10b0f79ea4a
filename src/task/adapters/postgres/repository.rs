//! `PostgreSQL` store implementing every task port.

use super::{
    models::{CommentRow, HistoryRow, NewTaskRow, TaskChangeset, TaskRow, UserRow},
    schema::{comments, task_histories, tasks, users},
};
use crate::task::{
    domain::{
        Comment, CommentId, HistoryId, HistoryRecord, PersistedCommentData, PersistedHistoryData,
        PersistedTaskData, Task, TaskChanges, TaskId, TaskStatus, TaskUpdatePlan, User, UserId,
        UserRole,
    },
    ports::{
        CommentRepository, HistoryRepository, TaskFilter, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult, UserRepository,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const TASKS_ASSIGNEE_FK: &str = "tasks_assignee_fkey";
const TASKS_CREATED_BY_FK: &str = "tasks_created_by_fkey";
const TASKS_UPDATED_BY_FK: &str = "tasks_updated_by_fkey";
const COMMENTS_TASK_FK: &str = "comments_task_id_fkey";
const COMMENTS_CREATED_BY_FK: &str = "comments_created_by_fkey";
const HISTORY_TASK_FK: &str = "task_histories_task_id_fkey";
const HISTORY_CHANGED_BY_FK: &str = "task_histories_changed_by_fkey";

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Records a write points at, used to name the one a foreign key missed.
#[derive(Debug, Clone, Copy, Default)]
struct References {
    task: Option<TaskId>,
    author: Option<UserId>,
    assignee: Option<UserId>,
}

impl References {
    const fn for_task(task: &Task, author: UserId) -> Self {
        Self {
            task: Some(task.id()),
            author: Some(author),
            assignee: task.assignee(),
        }
    }

    const fn for_history(record: &HistoryRecord) -> Self {
        Self {
            task: Some(record.task_id()),
            author: Some(record.changed_by()),
            assignee: None,
        }
    }

    const fn for_comment(comment: &Comment) -> Self {
        Self {
            task: Some(comment.task_id()),
            author: Some(comment.created_by()),
            assignee: None,
        }
    }

    fn missing(self, constraint: Option<&str>) -> Option<TaskRepositoryError> {
        match constraint? {
            COMMENTS_TASK_FK | HISTORY_TASK_FK => self.task.map(TaskRepositoryError::NotFound),
            TASKS_CREATED_BY_FK | TASKS_UPDATED_BY_FK | COMMENTS_CREATED_BY_FK
            | HISTORY_CHANGED_BY_FK => self.author.map(TaskRepositoryError::UserNotFound),
            TASKS_ASSIGNEE_FK => self.assignee.map(TaskRepositoryError::UserNotFound),
            _ => None,
        }
    }
}

/// Classifies a failed write.
///
/// Unique violations become `duplicate` when given; foreign-key violations
/// name the missing task or user. Anything else is a persistence error.
fn write_error(
    err: DieselError,
    refs: References,
    duplicate: Option<TaskRepositoryError>,
) -> TaskRepositoryError {
    let classified = match &err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => duplicate,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            refs.missing(info.constraint_name())
        }
        _ => None,
    };
    classified.unwrap_or_else(|| TaskRepositoryError::persistence(err))
}

fn insert_history(
    connection: &mut PgConnection,
    row: &HistoryRow,
    refs: References,
) -> TaskRepositoryResult<HistoryRecord> {
    let duplicate = TaskRepositoryError::DuplicateHistory(HistoryId::from_uuid(row.id));
    let inserted = diesel::insert_into(task_histories::table)
        .values(row)
        .returning(HistoryRow::as_returning())
        .get_result::<HistoryRow>(connection)
        .map_err(|err| write_error(err, refs, Some(duplicate)))?;
    row_to_history(inserted)
}

#[async_trait]
impl TaskRepository for PostgresTaskStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let duplicate = TaskRepositoryError::DuplicateTask(task.id());
        let refs = References::for_task(task, task.created_by());
        let new_row = to_new_task_row(task);
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| write_error(err, refs, Some(duplicate)))?;
            row_to_task(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_matching(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let lookup = filter.clone();
        self.run_blocking(move |connection| {
            let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
            if let Some(status) = lookup.status {
                query = query.filter(tasks::status.eq(status.as_str()));
            }
            if let Some(creator) = lookup.created_by {
                query = query.filter(tasks::created_by.eq(creator.into_inner()));
            }
            if let Some(fragment) = lookup.title_contains {
                query = query.filter(tasks::title.ilike(like_pattern(&fragment)));
            }
            let rows = query
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update_with<F>(&self, id: TaskId, plan: F) -> TaskRepositoryResult<TaskUpdatePlan>
    where
        F: FnOnce(&Task) -> TaskUpdatePlan + Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let row = tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .select(TaskRow::as_select())
                    .for_update()
                    .first::<TaskRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(id))?;
                let current = row_to_task(row)?;
                let planned = plan(&current);

                let history = planned
                    .history
                    .as_ref()
                    .map(|record| {
                        let history_row = to_history_row(record)?;
                        insert_history(tx, &history_row, References::for_history(record))
                    })
                    .transpose()?;
                let refs = References::for_task(&planned.task, planned.task.updated_by());
                let updated = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                    .set(&to_task_changeset(&planned.task))
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .map_err(|err| write_error(err, refs, None))?;
                Ok(TaskUpdatePlan {
                    task: row_to_task(updated)?,
                    history,
                })
            })
        })
        .await
    }

    async fn delete_cascade(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let task_uuid = id.into_inner();
                diesel::delete(comments::table.filter(comments::task_id.eq(task_uuid)))
                    .execute(tx)?;
                diesel::delete(task_histories::table.filter(task_histories::task_id.eq(task_uuid)))
                    .execute(tx)?;
                let deleted =
                    diesel::delete(tasks::table.filter(tasks::id.eq(task_uuid))).execute(tx)?;
                if deleted == 0 {
                    return Err(TaskRepositoryError::NotFound(id));
                }
                Ok(())
            })
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresTaskStore {
    async fn store_user(&self, user: &User) -> TaskRepositoryResult<()> {
        let duplicate = TaskRepositoryError::DuplicateUser(user.email().to_owned());
        let row = UserRow {
            id: user.id().into_inner(),
            email: user.email().to_owned(),
            role: user.role().as_str().to_owned(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| write_error(err, References::default(), Some(duplicate)))?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> TaskRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(row_to_user).transpose()
        })
        .await
    }
}

#[async_trait]
impl HistoryRepository for PostgresTaskStore {
    async fn append(&self, record: &HistoryRecord) -> TaskRepositoryResult<HistoryRecord> {
        let refs = References::for_history(record);
        let row = to_history_row(record)?;
        self.run_blocking(move |connection| insert_history(connection, &row, refs))
            .await
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<HistoryRecord>> {
        self.run_blocking(move |connection| {
            let rows = task_histories::table
                .filter(task_histories::task_id.eq(task_id.into_inner()))
                .order((task_histories::changed_at.asc(), task_histories::seq.asc()))
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for PostgresTaskStore {
    async fn store_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment> {
        let duplicate = TaskRepositoryError::DuplicateComment(comment.id());
        let refs = References::for_comment(comment);
        let row = to_comment_row(comment);
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(comments::table)
                .values(&row)
                .returning(CommentRow::as_returning())
                .get_result::<CommentRow>(connection)
                .map_err(|err| write_error(err, refs, Some(duplicate)))?;
            Ok(row_to_comment(inserted))
        })
        .await
    }

    async fn update_comment(&self, comment: &Comment) -> TaskRepositoryResult<Comment> {
        let comment_id = comment.id();
        let content = comment.content().to_owned();
        let updated_at = comment.updated_at();
        self.run_blocking(move |connection| {
            let updated =
                diesel::update(comments::table.filter(comments::id.eq(comment_id.into_inner())))
                    .set((
                        comments::content.eq(content),
                        comments::updated_at.eq(updated_at),
                    ))
                    .returning(CommentRow::as_returning())
                    .get_result::<CommentRow>(connection)
                    .optional()?
                    .ok_or(TaskRepositoryError::CommentNotFound(comment_id))?;
            Ok(row_to_comment(updated))
        })
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(comments::table.filter(comments::id.eq(id.into_inner())))
                .execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::CommentNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<Comment>> {
        self.run_blocking(move |connection| {
            let row = comments::table
                .filter(comments::id.eq(id.into_inner()))
                .select(CommentRow::as_select())
                .first::<CommentRow>(connection)
                .optional()?;
            Ok(row.map(row_to_comment))
        })
        .await
    }

    async fn comments_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let rows = comments::table
                .filter(comments::task_id.eq(task_id.into_inner()))
                .order(comments::created_at.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }
}

/// Builds an `ILIKE` pattern matching `fragment` anywhere, with wildcards
/// in the fragment escaped.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn to_new_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        assignee: task.assignee().map(UserId::into_inner),
        created_by: task.created_by().into_inner(),
        updated_by: task.updated_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_task_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        assignee: task.assignee().map(UserId::into_inner),
        updated_by: task.updated_by().into_inner(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        status,
        assignee: row.assignee.map(UserId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        updated_by: UserId::from_uuid(row.updated_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_user(row: UserRow) -> TaskRepositoryResult<User> {
    let role = UserRole::try_from(row.role.as_str()).map_err(TaskRepositoryError::persistence)?;
    User::from_parts(UserId::from_uuid(row.id), row.email, role)
        .map_err(TaskRepositoryError::persistence)
}

fn to_history_row(record: &HistoryRecord) -> TaskRepositoryResult<HistoryRow> {
    Ok(HistoryRow {
        id: record.id().into_inner(),
        task_id: record.task_id().into_inner(),
        changed_by: record.changed_by().into_inner(),
        changes: record.changes().to_json()?,
        changed_at: record.changed_at(),
    })
}

fn row_to_history(row: HistoryRow) -> TaskRepositoryResult<HistoryRecord> {
    let changes = TaskChanges::from_json(&row.changes)?;
    Ok(HistoryRecord::from_persisted(PersistedHistoryData {
        id: HistoryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        changed_by: UserId::from_uuid(row.changed_by),
        changes,
        changed_at: row.changed_at,
    }))
}

fn to_comment_row(comment: &Comment) -> CommentRow {
    CommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        content: comment.content().to_owned(),
        created_by: comment.created_by().into_inner(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    }
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        content: row.content,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
