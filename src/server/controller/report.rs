use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::IntoParams;

use crate::{
    model::{
        api::ErrorDto,
        pagination::PageDto,
        report::{ForensicReportDto, IngestResultDto, ReportDetailDto, ReportDto, ReportKind},
    },
    server::{
        controller::PaginationParams,
        error::AppError,
        middleware::{
            api_key::ApiKeyGuard,
            auth::{AccessLevel, AuthGuard},
        },
        service::{ingest::IngestService, report::ReportService},
        state::AppState,
    },
};

/// Tag for grouping report endpoints in OpenAPI documentation
pub static REPORT_TAG: &str = "report";

/// Selects how an uploaded file is parsed.
#[derive(Deserialize, IntoParams)]
pub struct IngestParams {
    /// `aggregate` (default) or `forensic`
    #[serde(default)]
    pub kind: ReportKind,
}

/// Get a page of a domain's aggregate reports, newest first.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/reports",
    tag = REPORT_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of aggregate reports", body = PageDto<ReportDto>),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_reports(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let reports = ReportService::new(&state.db)
        .list(domain_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(reports.into_dto(|r| r.into_dto()))))
}

/// Upload a report file for a domain.
///
/// The body is the raw file: XML, gzip or zip for aggregate reports, an ARF
/// message for forensic reports. The report must be about this domain or
/// one of its subdomains.
///
/// # Access Control
/// - `OrgManage` - Admins and owners of the owning organization
///
/// # Returns
/// - `201 Created` - Report stored
/// - `200 OK` - Report was already ingested
/// - `400 Bad Request` - Undecodable report or report for another domain
#[utoipa::path(
    post,
    path = "/api/domains/{domain_id}/reports",
    tag = REPORT_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        IngestParams
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Report ingested", body = IngestResultDto),
        (status = 200, description = "Duplicate report skipped", body = IngestResultDto),
        (status = 400, description = "Invalid report", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn upload_report(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<IngestParams>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::Manage)
        .await?;

    let result = IngestService::new(
        &state.db,
        &state.http_client,
        &state.discord_http,
        &state.app_url,
    )
    .ingest(domain.organization_id, Some(&domain), params.kind, &body)
    .await?;

    Ok((ingest_status(result.duplicate), Json(result.into_dto())))
}

/// Submit a report with an organization API key.
///
/// The domain is resolved from the report content among the domains of the
/// key's organization.
///
/// # Access Control
/// - `Authorization: Bearer <api key>`
#[utoipa::path(
    post,
    path = "/api/ingest",
    tag = REPORT_TAG,
    params(IngestParams),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Report ingested", body = IngestResultDto),
        (status = 200, description = "Duplicate report skipped", body = IngestResultDto),
        (status = 400, description = "Invalid report or unknown domain", body = ErrorDto),
        (status = 401, description = "Missing, unknown or revoked API key", body = ErrorDto),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
    security(("api_key" = [])),
)]
pub async fn ingest_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<IngestParams>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let api_key = ApiKeyGuard::new(&state.db).authenticate(&headers).await?;

    let result = IngestService::new(
        &state.db,
        &state.http_client,
        &state.discord_http,
        &state.app_url,
    )
    .ingest(api_key.organization_id, None, params.kind, &body)
    .await?;

    Ok((ingest_status(result.duplicate), Json(result.into_dto())))
}

/// Get an aggregate report with all of its records.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/reports/{report_id}",
    tag = REPORT_TAG,
    params(
        ("report_id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report with records", body = ReportDetailDto),
        (status = 404, description = "Report not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_report(
    State(state): State<AppState>,
    session: Session,
    Path(report_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, report, _) = AuthGuard::new(&state.db, &session)
        .require_report(report_id, AccessLevel::View)
        .await?;

    let detail = ReportService::new(&state.db).detail(report).await?;

    Ok((StatusCode::OK, Json(detail.into_dto())))
}

/// Delete an aggregate report.
///
/// # Access Control
/// - `OrgManage` - Admins and owners of the owning organization
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}",
    tag = REPORT_TAG,
    params(
        ("report_id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Report not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_report(
    State(state): State<AppState>,
    session: Session,
    Path(report_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let (_, report, _) = AuthGuard::new(&state.db, &session)
        .require_report(report_id, AccessLevel::Manage)
        .await?;

    ReportService::new(&state.db).delete(&report).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get a page of a domain's forensic reports, newest first.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/forensic",
    tag = REPORT_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of forensic reports", body = PageDto<ForensicReportDto>),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_forensic_reports(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let reports = ReportService::new(&state.db)
        .list_forensic(domain_id, params.page, params.per_page())
        .await?;

    Ok((StatusCode::OK, Json(reports.into_dto(|r| r.into_dto()))))
}

fn ingest_status(duplicate: bool) -> StatusCode {
    if duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    }
}
