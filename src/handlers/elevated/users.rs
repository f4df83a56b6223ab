use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::{require_role, ADMIN_ONLY};
use crate::database::models::PublicUser;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::{NewUser, UserPatch};
use crate::types::parse_id;

/// GET /api/users
pub async fn user_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<PublicUser>> {
    require_role(&user, ADMIN_ONLY)?;

    let users: Vec<PublicUser> = state.users.list().await?.into_iter().map(PublicUser::from).collect();
    let count = users.len() as u64;
    Ok(ApiResponse::success(users).count(count))
}

/// POST /api/users/create - admin variant of registration; honours role and status
pub async fn user_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewUser>,
) -> ApiResult<PublicUser> {
    require_role(&user, ADMIN_ONLY)?;

    let created = state.users.create(body).await?;
    Ok(ApiResponse::created(PublicUser::from(created)).message("User created successfully"))
}

/// GET /api/users/:id
pub async fn user_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<PublicUser> {
    require_role(&user, ADMIN_ONLY)?;

    let id = parse_id(&id, "user")?;
    let found = state.users.get(id).await?;
    Ok(ApiResponse::success(PublicUser::from(found)))
}

/// PUT /api/users/:id/update
pub async fn user_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserPatch>,
) -> ApiResult<PublicUser> {
    require_role(&user, ADMIN_ONLY)?;

    let id = parse_id(&id, "user")?;
    let updated = state.users.update(id, body).await?;
    Ok(ApiResponse::success(PublicUser::from(updated)).message("User updated successfully"))
}

/// DELETE /api/users/:id/delete
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&user, ADMIN_ONLY)?;

    let id = parse_id(&id, "user")?;
    state.users.delete(&user, id).await?;
    Ok(ApiResponse::ok("User deleted successfully"))
}
