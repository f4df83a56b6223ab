use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Quiz;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{parse_id, PageQuery};

#[derive(Debug, Default, Deserialize)]
pub struct QuizListQuery {
    #[serde(rename = "courseTitle")]
    pub course_title: Option<String>,
    pub teacher_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl QuizListQuery {
    fn filter(&self) -> Result<Filter, ApiError> {
        let mut filter = Filter::new();
        if let Some(title) = self.course_title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filter = filter.search(title, &["courseTitle"])?;
        }
        // An unparsable teacher id is ignored rather than rejected.
        if let Some(teacher_id) = self.teacher_id.as_deref().and_then(|t| Uuid::parse_str(t.trim()).ok()) {
            filter = filter.eq("teacher_id", teacher_id.to_string())?;
        }
        if let Some(status) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.eq("status", status.to_lowercase())?;
        }
        Ok(filter.order("created_at desc")?)
    }
}

/// GET /api/quizzes - paged quiz listing
pub async fn quiz_list(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> ApiResult<Vec<Quiz>> {
    let page = PageQuery {
        page: query.page.clone(),
        limit: query.limit.clone(),
    }
    .resolve(&state.config.api);

    let paged = query
        .filter()?
        .limit(page.limit as i64, Some(page.offset()?))?;
    let unpaged = paged.without_paging();

    let (quizzes, total) = futures::try_join!(
        state.store.quizzes.find(&paged),
        state.store.quizzes.count(&unpaged)
    )?;

    Ok(ApiResponse::success(quizzes).count(total).page(page.number))
}

/// GET /api/quizzes/:id
pub async fn quiz_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Quiz> {
    let id = parse_id(&id, "quiz")?;
    let quiz = state
        .store
        .quizzes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))?;
    Ok(ApiResponse::success(quiz))
}
