use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        api_key::{ApiKeyDto, CreateApiKeyDto, CreatedApiKeyDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::api_key::ApiKeyService,
        state::AppState,
    },
};

/// Tag for grouping API key endpoints in OpenAPI documentation
pub static API_KEY_TAG: &str = "api_key";

/// List the organization's API keys, revoked ones included.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/api-keys",
    tag = API_KEY_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "API keys", body = Vec<ApiKeyDto>),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let keys = ApiKeyService::new(&state.db).list(org_id).await?;

    let dtos: Vec<_> = keys.into_iter().map(|k| k.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Create an API key for machine ingestion.
///
/// The plaintext key is only part of this response.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/api-keys",
    tag = API_KEY_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CreateApiKeyDto,
    responses(
        (status = 201, description = "Key created", body = CreatedApiKeyDto),
        (status = 400, description = "Invalid name", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CreateApiKeyDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let (api_key, key) = ApiKeyService::new(&state.db)
        .create(org_id, user.id, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyDto {
            api_key: api_key.into_dto(),
            key,
        }),
    ))
}

/// Revoke an API key.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/api-keys/{id}",
    tag = API_KEY_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "API key ID")
    ),
    responses(
        (status = 204, description = "Key revoked"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Key not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn revoke_api_key(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let revoked = ApiKeyService::new(&state.db).revoke(org_id, id).await?;
    if !revoked {
        return Err(AppError::NotFound(format!("API key {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
