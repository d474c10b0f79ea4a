//! Port contracts for task management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.
//! A single store implements all of them so that task updates and their
//! history records can share a transaction.

pub mod comment;
pub mod history;
pub mod repository;
pub mod user;

pub use comment::CommentRepository;
pub use history::HistoryRepository;
pub use repository::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use user::UserRepository;

/// The full data-store capability consumed by task services.
pub trait TaskStore:
    TaskRepository + UserRepository + HistoryRepository + CommentRepository
{
}

impl<T> TaskStore for T where
    T: TaskRepository + UserRepository + HistoryRepository + CommentRepository
{
}
