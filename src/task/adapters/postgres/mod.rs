//! `PostgreSQL` adapters for task management persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskStore, TaskPgPool};
