//! End-to-end task flows against the in-memory store.

use super::helpers::{Services, register, services};
use rstest::rstest;
use tasktrail::task::{
    domain::TaskStatus,
    ports::TaskFilter,
    services::{CreateTaskRequest, ErrorKind, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_round_trip_through_every_service(services: Services) -> Result<(), eyre::Report> {
    let (_, alice) = register(&services, "alice@example.com").await?;
    let (bob_user, bob) = register(&services, "bob@example.com").await?;

    let created = services
        .lifecycle
        .create_task(alice, CreateTaskRequest::new("Prepare release notes"))
        .await?;
    services
        .mutation
        .update_task(
            created.id,
            bob,
            UpdateTaskRequest::new()
                .with_status("IN_PROGRESS")
                .with_assignee(bob_user.id().to_string()),
        )
        .await?;
    services
        .comments
        .create_comment(created.id, bob, "Drafted the first section")
        .await?;

    let details = services.lifecycle.get_task(created.id).await?;
    eyre::ensure!(details.task.status == TaskStatus::InProgress, "status not applied");
    eyre::ensure!(
        details.task.assignee.as_deref() == Some("bob@example.com"),
        "assignee not rendered as email"
    );
    eyre::ensure!(details.task.created_by == "alice@example.com", "creator changed");
    eyre::ensure!(details.task.updated_by == "bob@example.com", "updater not recorded");
    eyre::ensure!(details.comments.len() == 1, "expected one comment");
    eyre::ensure!(details.history.len() == 1, "expected one history entry");

    let denied = services.lifecycle.delete_task(created.id, bob).await;
    eyre::ensure!(
        matches!(&denied, Err(err) if err.kind() == ErrorKind::Forbidden),
        "non-owner delete should be forbidden, got {denied:?}"
    );

    services.lifecycle.delete_task(created.id, alice).await?;
    let remaining = services.lifecycle.list_tasks(&TaskFilter::new()).await?;
    eyre::ensure!(remaining.is_empty(), "task should be gone");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_update_leaves_task_as_it_was(services: Services) -> Result<(), eyre::Report> {
    let (_, alice) = register(&services, "alice@example.com").await?;
    let created = services
        .lifecycle
        .create_task(alice, CreateTaskRequest::new("Triage bugs"))
        .await?;

    let result = services
        .mutation
        .update_task_from_json(
            created.id,
            alice,
            r#"{"title":"Renamed","assignee":"does-not-exist"}"#,
        )
        .await;

    eyre::ensure!(
        matches!(&result, Err(err) if err.kind() == ErrorKind::InvalidRequest),
        "unknown assignee should be rejected, got {result:?}"
    );
    let details = services.lifecycle.get_task(created.id).await?;
    eyre::ensure!(details.task == created, "task should be unchanged");
    eyre::ensure!(details.history.is_empty(), "no history expected");
    Ok(())
}
