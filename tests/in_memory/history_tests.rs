//! Audit trail behaviour observed through the public services.

use super::helpers::{Services, register, services};
use rstest::rstest;
use tasktrail::task::{
    domain::TrackedField,
    services::{CreateTaskRequest, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_follows_successive_edits(services: Services) -> Result<(), eyre::Report> {
    let (_, alice) = register(&services, "alice@example.com").await?;
    let created = services
        .lifecycle
        .create_task(alice, CreateTaskRequest::new("Draft"))
        .await?;

    for status in ["IN_PROGRESS", "IN_PROGRESS", "IN_REVIEW", "DONE", "ARCHIVE"] {
        services
            .mutation
            .update_task(created.id, alice, UpdateTaskRequest::new().with_status(status))
            .await?;
    }

    let entries = services.history.history_for_task(created.id).await?;
    let transitions: Vec<(String, String)> = entries
        .iter()
        .filter_map(|entry| entry.changes.get(TrackedField::Status))
        .map(|change| (change.from.clone(), change.to.clone()))
        .collect();
    let expected = [
        ("TODO", "IN_PROGRESS"),
        ("IN_PROGRESS", "IN_REVIEW"),
        ("IN_REVIEW", "DONE"),
        ("DONE", "ARCHIVE"),
    ]
    .map(|(from, to)| (from.to_owned(), to.to_owned()));
    eyre::ensure!(
        transitions == expected,
        "unexpected transitions: {transitions:?}"
    );
    eyre::ensure!(
        entries.iter().all(|entry| entry.changes.len() == 1),
        "each entry should record only the status"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_serializes_as_field_map(services: Services) -> Result<(), eyre::Report> {
    let (_, alice) = register(&services, "alice@example.com").await?;
    let created = services
        .lifecycle
        .create_task(alice, CreateTaskRequest::new("Draft"))
        .await?;
    services
        .mutation
        .update_task(
            created.id,
            alice,
            UpdateTaskRequest::new().with_title("Final"),
        )
        .await?;

    let entries = services.history.history_for_task(created.id).await?;
    let json = serde_json::to_value(&entries)?;
    eyre::ensure!(
        json[0]["changes"] == serde_json::json!({"title": {"from": "Draft", "to": "Final"}}),
        "unexpected change payload: {json}"
    );
    Ok(())
}
