use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::PublicUser;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::{LoginOutcome, LoginRequest, NewUser};

/// POST /api/auth/login - exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginOutcome> {
    let outcome = state.users.authenticate_credentials(body).await?;
    Ok(ApiResponse::success(outcome).message("Login successful"))
}

/// POST /api/auth/register - self-service learner sign-up
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewUser>,
) -> ApiResult<Value> {
    let user = state.users.register(body).await?;

    Ok(ApiResponse::created(json!({
        "role": user.role,
        "user": PublicUser::from(&user),
    }))
    .message("User registered successfully"))
}

/// POST /api/auth/logout - tokens are stateless; the client discards its copy
pub async fn logout() -> ApiResponse<Value> {
    ApiResponse::ok("Logged out successfully")
}
