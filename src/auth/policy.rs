use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidOperation(String),
}

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const TEACHER_OR_ADMIN: &[Role] = &[Role::Teacher, Role::Admin];

/// Role membership. Admin only passes when listed.
pub fn require_role(identity: &User, allowed: &[Role]) -> Result<(), PolicyError> {
    if allowed.contains(&identity.role) {
        return Ok(());
    }
    let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(PolicyError::Forbidden(format!(
        "Access denied: requires {} role",
        names.join(" or ")
    )))
}

/// Admins bypass ownership entirely.
pub fn require_ownership(identity: &User, owner_id: Uuid) -> Result<(), PolicyError> {
    if identity.role == Role::Admin || identity.id == owner_id {
        return Ok(());
    }
    Err(PolicyError::Forbidden(
        "You do not have permission to modify this resource".to_string(),
    ))
}

pub fn forbid_self_delete(identity: &User, target_id: Uuid) -> Result<(), PolicyError> {
    if identity.id == target_id {
        return Err(PolicyError::InvalidOperation(
            "Cannot delete your own account".to_string(),
        ));
    }
    Ok(())
}
