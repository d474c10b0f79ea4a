//! User lookup port.

use super::TaskRepositoryResult;
use crate::task::domain::{User, UserId};
use async_trait::async_trait;

/// Storage for the users referenced by tasks.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::DuplicateUser`] when the ID or
    /// email is already taken.
    async fn store_user(&self, user: &User) -> TaskRepositoryResult<()>;

    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_user(&self, id: UserId) -> TaskRepositoryResult<Option<User>>;
}
