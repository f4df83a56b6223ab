use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::policy::{require_role, ADMIN_ONLY};
use crate::database::models::{QuestionDraft, Quiz};
use crate::database::Document;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};

use super::quizzes::load;

/// Question positions are non-negative integers within the current list.
fn parse_index(raw: &str, quiz: &Quiz) -> Result<usize, ApiError> {
    let index: usize = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid question index"))?;
    if index >= quiz.questions.len() {
        return Err(ApiError::bad_request("Question index out of range"));
    }
    Ok(index)
}

async fn save(state: &AppState, mut quiz: Quiz) -> Result<Quiz, ApiError> {
    quiz.touch();
    Ok(state.store.quizzes.replace(quiz).await?)
}

/// POST /api/quizzes/:id/questions - append one question
pub async fn question_add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<QuestionDraft>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let mut quiz = load(&state, &id).await?;
    let question = body
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid question: {}", e.message)))?;
    quiz.questions.push(question);

    let quiz = save(&state, quiz).await?;
    Ok(ApiResponse::created(quiz).message("Question added successfully"))
}

/// PUT /api/quizzes/:id/questions/:index - replace a question wholesale
pub async fn question_replace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, index)): Path<(String, String)>,
    ApiJson(body): ApiJson<QuestionDraft>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let mut quiz = load(&state, &id).await?;
    let index = parse_index(&index, &quiz)?;
    quiz.questions[index] = body
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid question: {}", e.message)))?;

    let quiz = save(&state, quiz).await?;
    Ok(ApiResponse::success(quiz).message("Question updated successfully"))
}

/// PATCH /api/quizzes/:id/questions/:index - overlay the given fields on the stored question
pub async fn question_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, index)): Path<(String, String)>,
    ApiJson(body): ApiJson<QuestionDraft>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let mut quiz = load(&state, &id).await?;
    let index = parse_index(&index, &quiz)?;
    let merged = QuestionDraft::from(&quiz.questions[index]).merge(body);
    quiz.questions[index] = merged
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid patched question: {}", e.message)))?;

    let quiz = save(&state, quiz).await?;
    Ok(ApiResponse::success(quiz).message("Question patched successfully"))
}

/// DELETE /api/quizzes/:id/questions/:index
pub async fn question_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, index)): Path<(String, String)>,
) -> ApiResult<Quiz> {
    require_role(&user, ADMIN_ONLY)?;

    let mut quiz = load(&state, &id).await?;
    let index = parse_index(&index, &quiz)?;
    quiz.questions.remove(index);

    let quiz = save(&state, quiz).await?;
    Ok(ApiResponse::success(quiz).message("Question deleted successfully"))
}
