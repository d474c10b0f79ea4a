//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasktrail::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Actor, User},
    ports::UserRepository,
    services::{CommentService, HistoryService, TaskLifecycleService, TaskMutationService},
};

/// Services wired to one shared in-memory store.
pub struct Services {
    pub store: Arc<InMemoryTaskStore>,
    pub lifecycle: TaskLifecycleService<InMemoryTaskStore, DefaultClock>,
    pub mutation: TaskMutationService<InMemoryTaskStore, DefaultClock>,
    pub comments: CommentService<InMemoryTaskStore, DefaultClock>,
    pub history: HistoryService<InMemoryTaskStore, DefaultClock>,
}

/// Provides a fresh set of services for each test.
#[fixture]
pub fn services() -> Services {
    let store = Arc::new(InMemoryTaskStore::new());
    let clock = Arc::new(DefaultClock);
    Services {
        lifecycle: TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&clock)),
        mutation: TaskMutationService::new(Arc::clone(&store), Arc::clone(&clock)),
        comments: CommentService::new(Arc::clone(&store), Arc::clone(&clock)),
        history: HistoryService::new(Arc::clone(&store), clock),
        store,
    }
}

/// Registers a user and returns an actor for it.
///
/// # Errors
///
/// Returns an error if the user is invalid or already registered.
pub async fn register(services: &Services, email: &str) -> Result<(User, Actor), eyre::Report> {
    let user = User::new(email)?;
    services.store.store_user(&user).await?;
    let actor = Actor::new(user.id());
    Ok((user, actor))
}
