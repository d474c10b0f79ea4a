//! In-memory adapters for task management.

mod store;

pub use store::InMemoryTaskStore;
