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
        dns::DnsCheckDto,
        domain::{CreateDomainDto, DomainDto, DomainSummaryDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AccessLevel, AuthGuard, Permission},
        service::{dns::DnsService, domain::DomainService},
        state::AppState,
    },
};

/// Tag for grouping domain endpoints in OpenAPI documentation
pub static DOMAIN_TAG: &str = "domain";

/// List the domains of an organization with their 30-day summary.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/domains",
    tag = DOMAIN_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Domains with message totals and pass rate", body = Vec<DomainSummaryDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_domains(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let domains = DomainService::new(&state.db).list(org_id).await?;

    let dtos: Vec<_> = domains.into_iter().map(|d| d.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Add a domain to an organization.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
///
/// # Returns
/// - `201 Created` - The new domain
/// - `400 Bad Request` - Invalid hostname, duplicate or plan limit reached
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/domains",
    tag = DOMAIN_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CreateDomainDto,
    responses(
        (status = 201, description = "Domain added", body = DomainDto),
        (status = 400, description = "Invalid or duplicate domain, or plan limit reached", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_domain(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CreateDomainDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let domain = DomainService::new(&state.db)
        .create(org_id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(domain.into_dto())))
}

/// Get one domain.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}",
    tag = DOMAIN_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID")
    ),
    responses(
        (status = 200, description = "Domain", body = DomainDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_domain(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    Ok((StatusCode::OK, Json(domain.into_dto())))
}

/// Delete a domain with its reports and sources.
///
/// # Access Control
/// - `OrgManage` - Admins and owners of the owning organization
#[utoipa::path(
    delete,
    path = "/api/domains/{domain_id}",
    tag = DOMAIN_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID")
    ),
    responses(
        (status = 204, description = "Domain deleted"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_domain(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::Manage)
        .await?;

    DomainService::new(&state.db).delete(&domain).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Look up the live DMARC, SPF and DKIM records of a domain.
///
/// Lookup failures show up as missing records and warnings, never as errors.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/dns",
    tag = DOMAIN_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID")
    ),
    responses(
        (status = 200, description = "DNS records and warnings", body = DnsCheckDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn check_dns(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let check = DnsService::new(&state.http_client).check(&domain.name).await;

    Ok((StatusCode::OK, Json(check.into_dto())))
}
