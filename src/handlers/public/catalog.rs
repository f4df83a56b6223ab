use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Course, PublicationStatus};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::parse_id;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

fn sort_order(sort: Option<&str>) -> &'static str {
    match sort {
        Some("price_asc") => "price asc",
        Some("price_desc") => "price desc",
        Some("rating") => "rating desc",
        Some("popular") => "enrolled_count desc",
        _ => "created_at desc",
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/courses/catalog - published courses only
pub async fn catalog_list(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<Course>> {
    let mut filter = Filter::by("status", PublicationStatus::Published.as_str())?;
    if let Some(category) = given(&query.category) {
        filter = filter.eq("category", category)?;
    }
    if let Some(level) = given(&query.level) {
        filter = filter.eq("level", level.to_lowercase())?;
    }
    if let Some(term) = given(&query.search) {
        filter = filter.search(term, &["title", "description"])?;
    }
    let filter = filter.order(sort_order(given(&query.sort)))?;

    let courses = state.store.courses.find(&filter).await?;
    let count = courses.len() as u64;
    Ok(ApiResponse::success(courses).count(count))
}

/// GET /api/courses/catalog/:id
pub async fn catalog_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Course> {
    let id = parse_id(&id, "course")?;

    match state.store.courses.find_by_id(id).await? {
        Some(course) if course.status == PublicationStatus::Published => Ok(ApiResponse::success(course)),
        _ => Err(ApiError::not_found("Course not found or not published")),
    }
}
