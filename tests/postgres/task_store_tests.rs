//! Task store behaviour against a real `PostgreSQL` database.

use super::helpers::TestDatabase;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use tasktrail::task::{
    domain::{
        Actor, Comment, FieldChange, HistoryId, HistoryRecord, NewTask, PersistedHistoryData,
        Task, TaskChanges, TaskId, TaskStatus, TrackedField, UserId,
    },
    ports::{
        CommentRepository, HistoryRepository, TaskFilter, TaskRepository, TaskRepositoryError,
    },
    services::{CreateTaskRequest, ErrorKind, TaskServiceError, UpdateTaskRequest},
};

fn title_history(task_id: TaskId, changed_by: UserId, changed_at: DateTime<Utc>) -> HistoryRecord {
    let mut changes = TaskChanges::new();
    changes.insert(TrackedField::Title, FieldChange::new("X", "Y"));
    HistoryRecord::from_persisted(PersistedHistoryData {
        id: HistoryId::new(),
        task_id,
        changed_by,
        changes,
        changed_at,
    })
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn status_update_writes_task_and_history() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;

    db.mutation
        .update_task(created.id, owner, UpdateTaskRequest::new().with_status("DONE"))
        .await?;

    let stored = db
        .store
        .find_by_id(created.id)
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(stored.status() == TaskStatus::Done, "status not persisted");
    let history = db.store.list_for_task(created.id).await?;
    eyre::ensure!(history.len() == 1, "expected one history row");
    let change = history
        .first()
        .and_then(|record| record.changes().get(TrackedField::Status).cloned());
    eyre::ensure!(
        change == Some(FieldChange::new("TODO", "DONE")),
        "unexpected change {change:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn cleared_assignee_is_stored_as_null() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let (assignee, _) = db.register("u1@example.com").await?;
    let created = db
        .lifecycle
        .create_task(
            owner,
            CreateTaskRequest::new("X").with_assignee(assignee.id().to_string()),
        )
        .await?;

    let response = db
        .mutation
        .update_task(created.id, owner, UpdateTaskRequest::new().with_assignee(""))
        .await?;

    eyre::ensure!(response.assignee.is_none(), "response still assigned");
    let stored = db
        .store
        .find_by_id(created.id)
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!(stored.assignee().is_none(), "assignee not cleared");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn rejected_update_writes_nothing() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;

    let result = db
        .mutation
        .update_task(
            created.id,
            owner,
            UpdateTaskRequest::new()
                .with_status("DONE")
                .with_assignee("does-not-exist"),
        )
        .await;

    eyre::ensure!(
        matches!(&result, Err(err) if err.kind() == ErrorKind::InvalidRequest),
        "expected invalid request, got {result:?}"
    );
    eyre::ensure!(
        db.store.list_for_task(created.id).await?.is_empty(),
        "no history expected"
    );
    let details = db.lifecycle.get_task(created.id).await?;
    eyre::ensure!(details.task == created, "task changed");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn concurrent_updates_serialize_on_the_row() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;

    let (left, right) = tokio::join!(
        db.mutation.update_task(
            created.id,
            owner,
            UpdateTaskRequest::new().with_status("IN_PROGRESS")
        ),
        db.mutation
            .update_task(created.id, owner, UpdateTaskRequest::new().with_status("DONE")),
    );
    left?;
    right?;

    let history = db.store.list_for_task(created.id).await?;
    let changes: Vec<FieldChange> = history
        .iter()
        .filter_map(|record| record.changes().get(TrackedField::Status).cloned())
        .collect();
    let [earlier, later] = changes.as_slice() else {
        return Err(eyre::eyre!("expected two status changes, got {changes:?}"));
    };
    eyre::ensure!(earlier.from == "TODO", "first change must start at TODO");
    eyre::ensure!(later.from == earlier.to, "history must chain: {changes:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn delete_removes_comments_and_history() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    db.comments.create_comment(created.id, owner, "note").await?;
    db.mutation
        .update_task(created.id, owner, UpdateTaskRequest::new().with_title("Y"))
        .await?;

    db.lifecycle.delete_task(created.id, owner).await?;

    eyre::ensure!(db.store.find_by_id(created.id).await?.is_none(), "task remains");
    eyre::ensure!(
        db.store.comments_for_task(created.id).await?.is_empty(),
        "comments remain"
    );
    eyre::ensure!(
        db.store.list_for_task(created.id).await?.is_empty(),
        "history remains"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn title_filter_treats_wildcards_literally() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    for title in ["Reach 50% coverage", "Reach 500 users", "Fix login_form"] {
        db.lifecycle
            .create_task(owner, CreateTaskRequest::new(title))
            .await?;
    }

    let percent = db
        .store
        .find_matching(&TaskFilter::new().with_title_contains("50%"))
        .await?;
    let underscore = db
        .store
        .find_matching(&TaskFilter::new().with_title_contains("LOGIN_"))
        .await?;

    eyre::ensure!(percent.len() == 1, "expected one literal % match");
    eyre::ensure!(underscore.len() == 1, "expected one literal _ match");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn corrupt_history_row_is_a_serialization_error() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (user, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    db.execute(&format!(
        "INSERT INTO task_histories (id, task_id, changed_by, changes, changed_at) \
         VALUES ('{}', '{}', '{}', 'not json', now())",
        uuid::Uuid::new_v4(),
        created.id,
        user.id()
    ))?;

    let result = db.store.list_for_task(created.id).await;

    eyre::ensure!(
        matches!(result, Err(TaskRepositoryError::Serialization(_))),
        "expected serialization error, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn responses_match_persisted_rows() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    eyre::ensure!(
        db.lifecycle.get_task(created.id).await?.task == created,
        "create response differs from the stored row"
    );

    let updated = db
        .mutation
        .update_task(created.id, owner, UpdateTaskRequest::new().with_status("DONE"))
        .await?;
    let comment = db.comments.create_comment(created.id, owner, "note").await?;
    let edited = db.comments.update_comment(comment.id, owner, "edited").await?;

    let details = db.lifecycle.get_task(created.id).await?;
    eyre::ensure!(details.task == updated, "update response differs from the stored row");
    eyre::ensure!(
        details.comments == vec![edited],
        "comment response differs from the stored row"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn unregistered_actor_update_is_user_not_found() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    let stranger = UserId::new();

    let result = db
        .mutation
        .update_task(
            created.id,
            Actor::new(stranger),
            UpdateTaskRequest::new().with_status("DONE"),
        )
        .await;

    eyre::ensure!(
        matches!(&result, Err(TaskServiceError::UserNotFound(id)) if *id == stranger),
        "expected user not found, got {result:?}"
    );
    eyre::ensure!(
        db.store.list_for_task(created.id).await?.is_empty(),
        "no history expected"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn foreign_key_violations_name_the_missing_row() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (owner_user, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    let stranger = UserId::new();
    let missing_task = TaskId::new();

    let assigned = Task::new(
        NewTask {
            title: "Y".to_owned(),
            description: String::new(),
            status: TaskStatus::Todo,
            assignee: Some(stranger),
        },
        owner_user.id(),
        &DefaultClock,
    )?;
    let task_result = db.store.store(&assigned).await;
    let history_result = db
        .store
        .append(&title_history(created.id, stranger, Utc::now()))
        .await;
    let orphan = Comment::new(missing_task, owner_user.id(), "hi", &DefaultClock)?;
    let comment_result = db.store.store_comment(&orphan).await;

    eyre::ensure!(
        matches!(&task_result, Err(TaskRepositoryError::UserNotFound(id)) if *id == stranger),
        "expected unknown assignee, got {task_result:?}"
    );
    eyre::ensure!(
        matches!(&history_result, Err(TaskRepositoryError::UserNotFound(id)) if *id == stranger),
        "expected unknown changer, got {history_result:?}"
    );
    eyre::ensure!(
        matches!(&comment_result, Err(TaskRepositoryError::NotFound(id)) if *id == missing_task),
        "expected missing task, got {comment_result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn failed_task_write_rolls_back_history() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (_, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    db.execute("ALTER TABLE tasks ADD CONSTRAINT tasks_never_done CHECK (status <> 'DONE')")?;

    let result = db
        .mutation
        .update_task(created.id, owner, UpdateTaskRequest::new().with_status("DONE"))
        .await;

    eyre::ensure!(
        matches!(&result, Err(err) if err.kind() == ErrorKind::Internal),
        "expected internal error, got {result:?}"
    );
    eyre::ensure!(
        db.store.list_for_task(created.id).await?.is_empty(),
        "history must roll back with the task write"
    );
    let details = db.lifecycle.get_task(created.id).await?;
    eyre::ensure!(details.task == created, "task changed");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires TASKTRAIL_DATABASE_URL"]
async fn history_sharing_a_timestamp_lists_in_append_order() -> Result<(), eyre::Report> {
    let db = TestDatabase::create()?;
    let (user, owner) = db.register("owner@example.com").await?;
    let created = db
        .lifecycle
        .create_task(owner, CreateTaskRequest::new("X"))
        .await?;
    let changed_at = Utc::now();
    let mut appended = Vec::new();
    for _ in 0..3 {
        let record = db
            .store
            .append(&title_history(created.id, user.id(), changed_at))
            .await?;
        appended.push(record.id());
    }

    let listed: Vec<HistoryId> = db
        .store
        .list_for_task(created.id)
        .await?
        .iter()
        .map(HistoryRecord::id)
        .collect();

    eyre::ensure!(listed == appended, "expected append order, got {listed:?}");
    Ok(())
}
