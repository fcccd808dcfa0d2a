use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        stats::{OverviewDto, TimelinePointDto},
    },
    server::{
        controller::WindowParams,
        error::AppError,
        middleware::auth::{AccessLevel, AuthGuard},
        service::{
            export::ExportService,
            stats::{window_days, StatsService},
        },
        state::AppState,
    },
};

/// Tag for grouping statistics endpoints in OpenAPI documentation
pub static STATS_TAG: &str = "stats";

/// Get aggregate statistics of a domain over the last `days` days.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/overview",
    tag = STATS_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        WindowParams
    ),
    responses(
        (status = 200, description = "Totals, dispositions and top sources", body = OverviewDto),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_overview(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let overview = StatsService::new(&state.db)
        .overview(domain_id, window_days(params.days))
        .await?;

    Ok((StatusCode::OK, Json(overview.into_dto())))
}

/// Get daily message counts of a domain, one point per UTC day.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/timeline",
    tag = STATS_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        WindowParams
    ),
    responses(
        (status = 200, description = "Daily points in ascending order", body = Vec<TimelinePointDto>),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let points = StatsService::new(&state.db)
        .timeline(domain_id, window_days(params.days))
        .await?;

    let dtos: Vec<_> = points.into_iter().map(|p| p.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Download the records of a domain's reports as CSV.
///
/// # Access Control
/// - `OrgView` - Any member of the owning organization
#[utoipa::path(
    get,
    path = "/api/domains/{domain_id}/export",
    tag = STATS_TAG,
    params(
        ("domain_id" = i32, Path, description = "Domain ID"),
        WindowParams
    ),
    responses(
        (status = 200, description = "CSV attachment, one row per record", content_type = "text/csv", body = String),
        (status = 404, description = "Domain not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn export_records(
    State(state): State<AppState>,
    session: Session,
    Path(domain_id): Path<i32>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    let (_, _, domain) = AuthGuard::new(&state.db, &session)
        .require_domain(domain_id, AccessLevel::View)
        .await?;

    let days = window_days(params.days);
    let csv = ExportService::new(&state.db)
        .records_csv(domain_id, days)
        .await?;

    let disposition = format!(
        "attachment; filename=\"dmarc-{}-{}d.csv\"",
        domain.name, days
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
