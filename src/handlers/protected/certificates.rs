use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::policy::{require_ownership, require_role, TEACHER_OR_ADMIN};
use crate::database::models::{Certificate, CertificateInput};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::types::parse_id;

async fn load(state: &AppState, raw_id: &str) -> Result<Certificate, ApiError> {
    let id = parse_id(raw_id, "certificate")?;
    state
        .store
        .certificates
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))
}

/// GET /api/certificates
pub async fn certificate_list(State(state): State<AppState>) -> ApiResult<Vec<Certificate>> {
    let filter = Filter::new().order("created_at desc")?;
    let certificates = state.store.certificates.find(&filter).await?;
    let count = certificates.len() as u64;
    Ok(ApiResponse::success(certificates).count(count))
}

/// GET /api/certificates/:id
pub async fn certificate_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Certificate> {
    Ok(ApiResponse::success(load(&state, &id).await?))
}

/// POST /api/certificates - teacher or admin; the caller is recorded as issuer
pub async fn certificate_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CertificateInput>,
) -> ApiResult<Certificate> {
    require_role(&user, TEACHER_OR_ADMIN)?;

    let certificate = body.into_certificate(user.id)?;
    if state.store.users.find_by_id(certificate.recipient).await?.is_none() {
        return Err(ApiError::not_found("Recipient not found"));
    }

    let certificate = state.store.certificates.insert(certificate).await?;
    tracing::info!(
        "Certificate {} issued to {} by {}",
        certificate.id,
        certificate.recipient,
        user.id
    );
    Ok(ApiResponse::created(certificate).message("Certificate created successfully"))
}

/// PUT /api/certificates/:id
pub async fn certificate_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CertificateInput>,
) -> ApiResult<Certificate> {
    let certificate = load(&state, &id).await?;
    require_ownership(&user, certificate.issued_by)?;

    let recipient_changed = body.recipient.filter(|r| *r != certificate.recipient);
    if let Some(recipient) = recipient_changed {
        if state.store.users.find_by_id(recipient).await?.is_none() {
            return Err(ApiError::not_found("Recipient not found"));
        }
    }

    let updated = body.overlay(&certificate)?;
    let updated = state.store.certificates.replace(updated).await?;
    Ok(ApiResponse::success(updated).message("Certificate updated successfully"))
}

/// DELETE /api/certificates/:id
pub async fn certificate_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let certificate = load(&state, &id).await?;
    require_ownership(&user, certificate.issued_by)?;

    state.store.certificates.delete(certificate.id).await?;
    Ok(ApiResponse::ok("Certificate deleted successfully"))
}
