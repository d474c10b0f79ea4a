//! Users referenced by tasks, and the authenticated actor context.

use super::{ParseUserRoleError, TaskDomainError, UserId};
use serde::{Deserialize, Serialize};

/// Authorization role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular account.
    #[default]
    User,
    /// Administrative account.
    Admin,
}

impl UserRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

/// A user known to the task store.
///
/// Credentials live with the authentication layer and are not modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    role: UserRole,
}

impl User {
    /// Creates a user with a fresh identifier and the default role.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEmail`] if the email is blank.
    pub fn new(email: impl Into<String>) -> Result<Self, TaskDomainError> {
        Self::from_parts(UserId::new(), email, UserRole::default())
    }

    /// Creates a user from known parts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEmail`] if the email is blank.
    pub fn from_parts(
        id: UserId,
        email: impl Into<String>,
        role: UserRole,
    ) -> Result<Self, TaskDomainError> {
        let raw_email: String = email.into();
        let trimmed = raw_email.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyEmail);
        }
        Ok(Self {
            id,
            email: trimmed.to_owned(),
            role,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }
}

/// Authenticated identity performing an operation.
///
/// Built once at the request boundary from verified credentials and passed
/// explicitly into every core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    user_id: UserId,
}

impl Actor {
    /// Creates an actor for a known user.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Creates an actor from a verified token subject.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidActor`] when the subject is not a
    /// user identifier.
    pub fn from_subject(subject: &str) -> Result<Self, TaskDomainError> {
        UserId::parse(subject)
            .map(Self::new)
            .ok_or_else(|| TaskDomainError::InvalidActor(subject.to_owned()))
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.user_id
    }
}
