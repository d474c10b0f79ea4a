//! Application services for task management.

mod comments;
mod error;
mod history;
mod lifecycle;
mod mutation;
mod requests;
mod responses;

pub use comments::CommentService;
pub use error::{ErrorKind, TaskServiceError, TaskServiceResult};
pub use history::HistoryService;
pub use lifecycle::TaskLifecycleService;
pub use mutation::TaskMutationService;
pub use requests::{CreateTaskRequest, UpdateTaskRequest};
pub use responses::{CommentResponse, HistoryEntry, TaskDetails, TaskResponse};
