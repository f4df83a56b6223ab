use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::ops::Deref;

use crate::app::AppState;
use crate::auth::{authenticate, bearer_token, AuthError};
use crate::database::models::User;
use crate::error::ApiError;

/// Live user record for the current request, inserted by `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

impl Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Authentication gate: runs before every protected handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidHeader))
        .transpose()?;
    let token = bearer_token(header)?;

    let user = authenticate(Some(token), &state.tokens, state.store.users.as_ref()).await?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
