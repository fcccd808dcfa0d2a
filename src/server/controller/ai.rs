use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        ai::{AiIntegrationDto, UpsertAiIntegrationDto},
        api::ErrorDto,
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::ai::UpsertAiIntegrationParams,
        service::ai::{AiService, DEFAULT_MODEL},
        state::AppState,
    },
};

/// Tag for grouping AI integration endpoints in OpenAPI documentation
pub static AI_TAG: &str = "ai";

/// Get the organization's AI integration with the key masked.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/ai",
    tag = AI_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "AI integration", body = AiIntegrationDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "No integration configured", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_ai_integration(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let integration = AiService::new(&state.db, &state.http_client)
        .get_integration(org_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No AI integration configured".to_string()))?;

    Ok((StatusCode::OK, Json(integration.into_dto())))
}

/// Create or update the organization's AI integration.
///
/// Omitting `api_key` keeps the stored key.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    put,
    path = "/api/organizations/{org_id}/ai",
    tag = AI_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = UpsertAiIntegrationDto,
    responses(
        (status = 200, description = "Integration saved", body = AiIntegrationDto),
        (status = 400, description = "Missing API key or model", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn upsert_ai_integration(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<UpsertAiIntegrationDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let integration = AiService::new(&state.db, &state.http_client)
        .save_integration(UpsertAiIntegrationParams {
            organization_id: org_id,
            api_key: payload.api_key,
            model: payload.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            enabled: payload.enabled,
        })
        .await?;

    Ok((StatusCode::OK, Json(integration.into_dto())))
}

/// Remove the organization's AI integration.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/ai",
    tag = AI_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 204, description = "Integration removed"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "No integration configured", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_ai_integration(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let deleted = AiService::new(&state.db, &state.http_client)
        .delete_integration(org_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound("No AI integration configured".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
