//! Shared world state for task update BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasktrail::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{HistoryRecord, Task, User},
    ports::{HistoryRepository, TaskRepository},
    services::{TaskMutationService, TaskResponse, TaskServiceResult},
};

/// Service type used by the BDD world.
pub type TestMutationService = TaskMutationService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for task update behaviour tests.
pub struct TaskUpdateWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub clock: Arc<DefaultClock>,
    pub service: TestMutationService,
    pub users: HashMap<String, User>,
    pub original_task: Option<Task>,
    pub last_update_result: Option<TaskServiceResult<TaskResponse>>,
}

impl TaskUpdateWorld {
    /// Creates a world with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let clock = Arc::new(DefaultClock);
        let service = TaskMutationService::new(Arc::clone(&store), Arc::clone(&clock));

        Self {
            store,
            clock,
            service,
            users: HashMap::new(),
            original_task: None,
            last_update_result: None,
        }
    }

    /// Returns the user registered under `alias`.
    pub fn user(&self, alias: &str) -> Result<&User, eyre::Report> {
        self.users
            .get(alias)
            .ok_or_else(|| eyre::eyre!("no user registered as {alias}"))
    }

    /// Returns the task as it was created by the scenario.
    pub fn original_task(&self) -> Result<&Task, eyre::Report> {
        self.original_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Reads the task back from the store.
    pub fn stored_task(&self) -> Result<Task, eyre::Report> {
        let task_id = self.original_task()?.id();
        run_async(self.store.find_by_id(task_id))?
            .ok_or_else(|| eyre::eyre!("task {task_id} vanished from the store"))
    }

    /// Reads the task's history from the store, oldest first.
    pub fn history(&self) -> Result<Vec<HistoryRecord>, eyre::Report> {
        let task_id = self.original_task()?.id();
        Ok(run_async(self.store.list_for_task(task_id))?)
    }
}

impl Default for TaskUpdateWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskUpdateWorld {
    TaskUpdateWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
