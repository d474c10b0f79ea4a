//! Then steps for task update BDD scenarios.

use super::world::TaskUpdateWorld;
use rstest_bdd_macros::then;
use tasktrail::task::{
    domain::{FieldChange, TaskStatus, TrackedField},
    services::ErrorKind,
};

#[then("the update succeeds")]
fn update_succeeds(world: &TaskUpdateWorld) -> Result<(), eyre::Report> {
    match world.last_update_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("no update was submitted")),
    }
}

#[then("the update fails as an invalid request")]
fn update_fails_as_invalid_request(world: &TaskUpdateWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no update was submitted"))?;
    match result {
        Err(err) if err.kind() == ErrorKind::InvalidRequest => Ok(()),
        other => Err(eyre::eyre!("expected an invalid request error, got {other:?}")),
    }
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskUpdateWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let stored = world.stored_task()?;
    eyre::ensure!(
        stored.status() == expected,
        "expected status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then("the task is unassigned")]
fn task_is_unassigned(world: &TaskUpdateWorld) -> Result<(), eyre::Report> {
    let stored = world.stored_task()?;
    eyre::ensure!(
        stored.assignee().is_none(),
        "expected no assignee, found {:?}",
        stored.assignee()
    );
    Ok(())
}

#[then("the task is unchanged")]
fn task_is_unchanged(world: &TaskUpdateWorld) -> Result<(), eyre::Report> {
    let stored = world.stored_task()?;
    eyre::ensure!(
        &stored == world.original_task()?,
        "task changed: {stored:?}"
    );
    Ok(())
}

#[then("the task has {count:usize} history records")]
fn task_has_history_records(world: &TaskUpdateWorld, count: usize) -> Result<(), eyre::Report> {
    let history = world.history()?;
    eyre::ensure!(
        history.len() == count,
        "expected {count} history records, found {}",
        history.len()
    );
    Ok(())
}

#[then(r#"the latest history entry changes "{field}" from "{from}" to "{to}""#)]
fn latest_entry_changes_field(
    world: &TaskUpdateWorld,
    field: String,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    let tracked = match field.as_str() {
        "title" => TrackedField::Title,
        "description" => TrackedField::Description,
        "status" => TrackedField::Status,
        "assignee" => TrackedField::Assignee,
        other => return Err(eyre::eyre!("unknown tracked field {other}")),
    };
    expect_latest_change(world, tracked, &FieldChange::new(from, to))
}

#[then(r#"the latest history entry moves the assignee from "{alias}" to nobody"#)]
fn latest_entry_clears_assignee(world: &TaskUpdateWorld, alias: String) -> Result<(), eyre::Report> {
    let previous = world.user(&alias)?.id().to_string();
    expect_latest_change(
        world,
        TrackedField::Assignee,
        &FieldChange::new(previous, ""),
    )
}

#[then(r#"the task was last updated by "{alias}""#)]
fn task_last_updated_by(world: &TaskUpdateWorld, alias: String) -> Result<(), eyre::Report> {
    let expected = world.user(&alias)?.id();
    let stored = world.stored_task()?;
    eyre::ensure!(
        stored.updated_by() == expected,
        "expected updater {expected}, found {}",
        stored.updated_by()
    );
    Ok(())
}

fn expect_latest_change(
    world: &TaskUpdateWorld,
    field: TrackedField,
    expected: &FieldChange,
) -> Result<(), eyre::Report> {
    let history = world.history()?;
    let latest = history
        .last()
        .ok_or_else(|| eyre::eyre!("no history recorded"))?;
    eyre::ensure!(
        latest.changes().len() == 1,
        "expected a single field change, found {:?}",
        latest.changes()
    );
    let change = latest
        .changes()
        .get(field)
        .ok_or_else(|| eyre::eyre!("no change recorded for {}", field.as_str()))?;
    eyre::ensure!(change == expected, "expected {expected:?}, found {change:?}");
    Ok(())
}
