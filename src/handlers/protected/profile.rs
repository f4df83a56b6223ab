use axum::Extension;

use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/users/profile - the caller as currently stored
pub async fn profile_get(Extension(user): Extension<AuthUser>) -> ApiResult<PublicUser> {
    Ok(ApiResponse::success(PublicUser::from(&user.0)))
}
