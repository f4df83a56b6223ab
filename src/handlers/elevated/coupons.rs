use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::{require_role, ADMIN_ONLY};
use crate::database::models::{Coupon, CouponInput};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::types::parse_id;

async fn load(state: &AppState, raw_id: &str) -> Result<Coupon, ApiError> {
    let id = parse_id(raw_id, "coupon")?;
    state
        .store
        .coupons
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))
}

/// POST /api/coupons
pub async fn coupon_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CouponInput>,
) -> ApiResult<Coupon> {
    require_role(&user, ADMIN_ONLY)?;

    let coupon = state.store.coupons.insert(body.into_coupon()?).await?;
    tracing::info!("Coupon {} created", coupon.code);
    Ok(ApiResponse::created(coupon).message("Coupon created successfully"))
}

/// GET /api/coupons - newest first
pub async fn coupon_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Coupon>> {
    require_role(&user, ADMIN_ONLY)?;

    let coupons = state.store.coupons.find(&Filter::new().order("created_at desc")?).await?;
    let count = coupons.len() as u64;
    Ok(ApiResponse::success(coupons).count(count))
}

/// GET /api/coupons/:id
pub async fn coupon_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Coupon> {
    require_role(&user, ADMIN_ONLY)?;
    Ok(ApiResponse::success(load(&state, &id).await?))
}

/// PUT /api/coupons/:id
pub async fn coupon_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CouponInput>,
) -> ApiResult<Coupon> {
    require_role(&user, ADMIN_ONLY)?;

    let coupon = load(&state, &id).await?;
    let updated = state.store.coupons.replace(body.overlay(&coupon)?).await?;
    Ok(ApiResponse::success(updated).message("Coupon updated successfully"))
}

/// DELETE /api/coupons/:id
pub async fn coupon_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    require_role(&user, ADMIN_ONLY)?;

    let coupon = load(&state, &id).await?;
    state.store.coupons.delete(coupon.id).await?;
    Ok(ApiResponse::ok("Coupon deleted successfully"))
}
