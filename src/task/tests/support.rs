//! Shared fixtures for task unit tests.

use std::sync::Arc;

use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Actor, NewTask, Task, TaskStatus, User, UserId},
    ports::{TaskRepository, UserRepository},
};
use mockable::DefaultClock;

/// In-memory store with two registered users.
pub(super) struct Seeded {
    pub(super) store: Arc<InMemoryTaskStore>,
    pub(super) clock: Arc<DefaultClock>,
    pub(super) owner: User,
    pub(super) other: User,
}

impl Seeded {
    pub(super) async fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let owner = register(&store, "owner@example.com").await;
        let other = register(&store, "other@example.com").await;
        Self {
            store,
            clock: Arc::new(DefaultClock),
            owner,
            other,
        }
    }

    pub(super) fn owner_actor(&self) -> Actor {
        Actor::new(self.owner.id())
    }

    pub(super) fn other_actor(&self) -> Actor {
        Actor::new(self.other.id())
    }

    /// Stores a task created by the owner.
    pub(super) async fn task(&self, title: &str, status: TaskStatus, assignee: Option<UserId>) -> Task {
        let task = Task::new(
            NewTask {
                title: title.to_owned(),
                description: String::new(),
                status,
                assignee,
            },
            self.owner.id(),
            &*self.clock,
        )
        .expect("valid task");
        self.store.store(&task).await.expect("task stored");
        task
    }
}

pub(super) async fn register(store: &InMemoryTaskStore, email: &str) -> User {
    let user = User::new(email).expect("valid user");
    store.store_user(&user).await.expect("user stored");
    user
}
