use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::{require_role, ADMIN_ONLY};
use crate::database::models::{Quiz, QuizInput};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::types::parse_id;

pub(super) async fn load(state: &AppState, raw_id: &str) -> Result<Quiz, ApiError> {
    let id = parse_id(raw_id, "quiz")?;
    state
        .store
        .quizzes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))
}

/// POST /api/quizzes/create
pub async fn quiz_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<QuizInput>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let quiz = state.store.quizzes.insert(body.into_quiz(user.id)?).await?;
    tracing::info!("Quiz {} created with {} questions", quiz.id, quiz.questions.len());
    Ok(ApiResponse::created(quiz).message("Quiz created successfully"))
}

/// PUT /api/quizzes/:id/update
pub async fn quiz_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<QuizInput>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let quiz = load(&state, &id).await?;
    let updated = state.store.quizzes.replace(body.overlay(&quiz)?).await?;
    Ok(ApiResponse::success(updated).message("Quiz updated successfully"))
}

/// DELETE /api/quizzes/:id/delete
pub async fn quiz_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&user, ADMIN_ONLY)?;

    let quiz = load(&state, &id).await?;
    state.store.quizzes.delete(quiz.id).await?;
    Ok(ApiResponse::ok("Quiz deleted successfully"))
}
