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
        source::{CreateKnownSenderDto, KnownSenderDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::source::CreateKnownSenderParams,
        service::known_sender::KnownSenderService,
        state::AppState,
    },
};

/// Tag for grouping known sender endpoints in OpenAPI documentation
pub static KNOWN_SENDER_TAG: &str = "known_sender";

/// List the built-in senders and those added by the organization.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/known-senders",
    tag = KNOWN_SENDER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Known senders", body = Vec<KnownSenderDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_known_senders(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let senders = KnownSenderService::new(&state.db).list(org_id).await?;

    let dtos: Vec<_> = senders.into_iter().map(|s| s.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Add a sender matched by hostname suffix.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/known-senders",
    tag = KNOWN_SENDER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CreateKnownSenderDto,
    responses(
        (status = 201, description = "Sender added", body = KnownSenderDto),
        (status = 400, description = "Blank name or invalid suffix", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_known_sender(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CreateKnownSenderDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let sender = KnownSenderService::new(&state.db)
        .create(CreateKnownSenderParams {
            organization_id: Some(org_id),
            name: payload.name,
            hostname_suffix: payload.hostname_suffix,
            description: payload.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(sender.into_dto())))
}

/// Remove a sender added by the organization.
///
/// Built-in senders can't be removed.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/known-senders/{id}",
    tag = KNOWN_SENDER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Known sender ID")
    ),
    responses(
        (status = 204, description = "Sender removed"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Sender not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_known_sender(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let deleted = KnownSenderService::new(&state.db).delete(org_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Known sender {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
