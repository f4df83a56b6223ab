use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::{require_ownership, require_role, TEACHER_OR_ADMIN};
use crate::database::models::{Course, CourseInput, Role};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::types::parse_id;

async fn load(state: &AppState, raw_id: &str) -> Result<Course, ApiError> {
    let id = parse_id(raw_id, "course")?;
    state
        .store
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))
}

/// GET /api/courses - teachers see their own courses, admins see all
pub async fn course_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Course>> {
    require_role(&user, TEACHER_OR_ADMIN)?;

    let mut filter = Filter::new();
    if user.role == Role::Teacher {
        filter = filter.eq("teacher_id", user.id.to_string())?;
    }
    let courses = state.store.courses.find(&filter.order("created_at desc")?).await?;
    let count = courses.len() as u64;
    Ok(ApiResponse::success(courses).count(count))
}

/// POST /api/courses/create - the caller becomes the owner
pub async fn course_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CourseInput>,
) -> ApiResult<Course> {
    require_role(&user, TEACHER_OR_ADMIN)?;

    let course = body.into_course(&user)?;
    let course = state.store.courses.insert(course).await?;
    tracing::info!("Course {} created by {}", course.id, user.id);
    Ok(ApiResponse::created(course).message("Course created successfully"))
}

/// GET /api/courses/:id
pub async fn course_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Course> {
    require_role(&user, TEACHER_OR_ADMIN)?;
    let course = load(&state, &id).await?;
    require_ownership(&user, course.teacher_id)?;
    Ok(ApiResponse::success(course))
}

/// PUT /api/courses/:id/update
pub async fn course_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CourseInput>,
) -> ApiResult<Course> {
    require_role(&user, TEACHER_OR_ADMIN)?;
    let course = load(&state, &id).await?;
    require_ownership(&user, course.teacher_id)?;

    let updated = body.overlay(&course)?;
    let updated = state.store.courses.replace(updated).await?;
    Ok(ApiResponse::success(updated).message("Course updated successfully"))
}

/// DELETE /api/courses/:id/delete
pub async fn course_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&user, TEACHER_OR_ADMIN)?;
    let course = load(&state, &id).await?;
    require_ownership(&user, course.teacher_id)?;

    state.store.courses.delete(course.id).await?;
    tracing::info!("Course {} deleted by {}", course.id, user.id);
    Ok(ApiResponse::ok("Course deleted successfully"))
}
