use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::require_ownership;
use crate::database::models::{Feedback, FeedbackInput};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::types::parse_id;

const NOT_FOUND: &str = "Feedback not found or you do not have permission to update it";

/// Hidden feedback behaves as if it did not exist.
async fn load_visible(state: &AppState, raw_id: &str) -> Result<Feedback, ApiError> {
    let id = parse_id(raw_id, "feedback")?;
    state
        .store
        .feedbacks
        .find_by_id(id)
        .await?
        .filter(Feedback::is_visible)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// POST /api/feedbacks/create
pub async fn feedback_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<FeedbackInput>,
) -> ApiResult<Feedback> {
    let feedback = body.into_feedback(user.id)?;
    let feedback = state.store.feedbacks.insert(feedback).await?;
    Ok(ApiResponse::created(feedback).message("Feedback submitted successfully"))
}

/// GET /api/feedbacks/my-feedbacks - the caller's visible feedback, newest first
pub async fn feedback_mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Feedback>> {
    let filter = Filter::by("userId", user.id.to_string())?
        .eq("status", "active")?
        .order("created_at desc")?;
    let feedbacks = state.store.feedbacks.find(&filter).await?;
    let count = feedbacks.len() as u64;
    Ok(ApiResponse::success(feedbacks).count(count))
}

/// PUT /api/feedbacks/:id
pub async fn feedback_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<FeedbackInput>,
) -> ApiResult<Feedback> {
    let feedback = load_visible(&state, &id).await?;
    require_ownership(&user, feedback.user_id)?;

    let updated = body.overlay(&feedback)?;
    let updated = state.store.feedbacks.replace(updated).await?;
    Ok(ApiResponse::success(updated).message("Feedback updated successfully"))
}

/// DELETE /api/feedbacks/:id - soft delete
pub async fn feedback_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let mut feedback = load_visible(&state, &id).await?;
    require_ownership(&user, feedback.user_id)?;

    feedback.hide();
    state.store.feedbacks.replace(feedback).await?;
    Ok(ApiResponse::ok("Feedback deleted successfully"))
}
