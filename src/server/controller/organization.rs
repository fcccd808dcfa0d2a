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
        organization::{CreateOrganizationDto, OrganizationDto, UpdateOrganizationDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::organization::OrganizationService,
        state::AppState,
    },
};

/// Tag for grouping organization endpoints in OpenAPI documentation
pub static ORGANIZATION_TAG: &str = "organization";

/// List the organizations the user belongs to.
///
/// # Returns
/// - `200 OK` - Organizations with the user's role and domain counts
/// - `401 Unauthorized` - Not logged in
#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = ORGANIZATION_TAG,
    responses(
        (status = 200, description = "Organizations of the user", body = Vec<OrganizationDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let organizations = OrganizationService::new(&state.db)
        .list_for_user(user.id)
        .await?;

    let dtos: Vec<_> = organizations.into_iter().map(|o| o.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Create an organization owned by the current user.
///
/// # Returns
/// - `201 Created` - The new organization
/// - `400 Bad Request` - Empty name
/// - `401 Unauthorized` - Not logged in
#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = ORGANIZATION_TAG,
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created", body = OrganizationDto),
        (status = 400, description = "Invalid name", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_organization(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateOrganizationDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let organization = OrganizationService::new(&state.db)
        .create(user.id, payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(organization.into_dto())))
}

/// Get one organization.
///
/// # Access Control
/// - `OrgView` - Any member
///
/// # Returns
/// - `200 OK` - The organization with the caller's role
/// - `404 Not Found` - Organization doesn't exist or user is not a member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}",
    tag = ORGANIZATION_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization", body = OrganizationDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_organization(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, membership) = AuthGuard::new(&state.db, &session)
        .require_member(Permission::OrgView(org_id))
        .await?;

    let organization = OrganizationService::new(&state.db)
        .get(org_id, membership.role)
        .await?;

    Ok((StatusCode::OK, Json(organization.into_dto())))
}

/// Rename an organization.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    put,
    path = "/api/organizations/{org_id}",
    tag = ORGANIZATION_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = UpdateOrganizationDto,
    responses(
        (status = 200, description = "Organization renamed", body = OrganizationDto),
        (status = 400, description = "Invalid name", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_organization(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<UpdateOrganizationDto>,
) -> Result<impl IntoResponse, AppError> {
    let (_, membership) = AuthGuard::new(&state.db, &session)
        .require_member(Permission::OrgManage(org_id))
        .await?;

    let organization = OrganizationService::new(&state.db)
        .rename(org_id, membership.role, payload.name)
        .await?;

    Ok((StatusCode::OK, Json(organization.into_dto())))
}

/// Delete an organization with all of its domains, reports and members.
///
/// # Access Control
/// - `OrgOwner` - Owners only
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}",
    tag = ORGANIZATION_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 403, description = "Not an owner", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_organization(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgOwner(org_id)])
        .await?;

    OrganizationService::new(&state.db).delete(org_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
