//! Domain model for task management.
//!
//! Tasks, comments, users and history records live here together with the
//! diff engine and the pure validation and permission rules. Nothing in this
//! module touches storage.

mod comment;
mod error;
mod history;
mod ids;
mod permission;
mod plan;
mod task;
mod user;
mod validation;

pub use comment::{Comment, PersistedCommentData};
pub use error::{
    ChangeSerializationError, ParseTaskStatusError, ParseUserRoleError, TaskDomainError,
};
pub use history::{
    FieldChange, HistoryRecord, PersistedHistoryData, TaskChanges, TrackedField, diff_task,
};
pub use ids::{CommentId, HistoryId, TaskId, UserId};
pub use permission::is_owner;
pub use plan::TaskUpdatePlan;
pub use task::{AssigneeUpdate, NewTask, PersistedTaskData, Task, TaskEdit, TaskStatus};
pub use user::{Actor, User, UserRole};
pub use validation::{parse_assignee, validate_status, validate_title};
