//! Ownership checks.

use super::UserId;

/// Returns `true` when `actor` owns a resource created by `resource_owner`.
///
/// Gates comment edits, comment deletion and task deletion. Task updates are
/// deliberately not gated.
#[must_use]
pub fn is_owner(resource_owner: UserId, actor: UserId) -> bool {
    resource_owner == actor
}
