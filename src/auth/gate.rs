use thiserror::Error;
use tracing::{debug, warn};

use super::token::{TokenRejection, TokenService};
use crate::database::models::User;
use crate::database::{Collection, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,

    #[error("authorization header is not a bearer token")]
    InvalidHeader,

    #[error("token rejected: {0}")]
    InvalidToken(TokenRejection),

    #[error("token subject no longer exists")]
    UnknownSubject,

    #[error("account is not active")]
    Inactive,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Resolve a bearer token to the live user record.
///
/// The token only contributes the subject id; role and status come from the
/// store on every call, so suspensions and role changes apply immediately.
pub async fn authenticate(
    token: Option<&str>,
    tokens: &TokenService,
    users: &dyn Collection<User>,
) -> Result<User, AuthError> {
    let token = token.ok_or(AuthError::MissingToken)?;

    let claims = tokens.verify(token).map_err(|rejection| {
        warn!("Token rejected: {}", rejection);
        AuthError::InvalidToken(rejection)
    })?;

    let user = users.find_by_id(claims.id).await?.ok_or_else(|| {
        warn!("Token subject {} not found", claims.id);
        AuthError::UnknownSubject
    })?;

    if !user.is_active() {
        warn!("Rejected {} account {}", user.status, user.id);
        return Err(AuthError::Inactive);
    }

    debug!("Authenticated {} as {}", user.id, user.role);
    Ok(user)
}
