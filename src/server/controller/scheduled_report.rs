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
        scheduled_report::{ScheduledReportDto, UpsertScheduledReportDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::scheduled_report::ScheduledReportService,
        state::AppState,
    },
};

/// Tag for grouping scheduled report endpoints in OpenAPI documentation
pub static SCHEDULED_REPORT_TAG: &str = "scheduled_report";

/// List the organization's scheduled summaries.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/scheduled-reports",
    tag = SCHEDULED_REPORT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Scheduled reports", body = Vec<ScheduledReportDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_scheduled_reports(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let schedules = ScheduledReportService::new(&state.db).list(org_id).await?;

    let dtos: Vec<_> = schedules.into_iter().map(|s| s.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Schedule a periodic summary posted to a webhook.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/scheduled-reports",
    tag = SCHEDULED_REPORT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = UpsertScheduledReportDto,
    responses(
        (status = 201, description = "Schedule created", body = ScheduledReportDto),
        (status = 400, description = "Invalid webhook URL", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_scheduled_report(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<UpsertScheduledReportDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let schedule = ScheduledReportService::new(&state.db)
        .create(
            org_id,
            payload.frequency,
            payload.webhook_url,
            payload.webhook_kind,
            payload.enabled,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(schedule.into_dto())))
}

/// Replace the settings of a scheduled summary.
///
/// The next run is rescheduled one period from now.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    put,
    path = "/api/organizations/{org_id}/scheduled-reports/{id}",
    tag = SCHEDULED_REPORT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Scheduled report ID")
    ),
    request_body = UpsertScheduledReportDto,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduledReportDto),
        (status = 400, description = "Invalid webhook URL", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Schedule not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_scheduled_report(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
    Json(payload): Json<UpsertScheduledReportDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let schedule = ScheduledReportService::new(&state.db)
        .update(
            id,
            org_id,
            payload.frequency,
            payload.webhook_url,
            payload.webhook_kind,
            payload.enabled,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scheduled report {} not found", id)))?;

    Ok((StatusCode::OK, Json(schedule.into_dto())))
}

/// Delete a scheduled summary.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/scheduled-reports/{id}",
    tag = SCHEDULED_REPORT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Scheduled report ID")
    ),
    responses(
        (status = 204, description = "Schedule deleted"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Schedule not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_scheduled_report(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let deleted = ScheduledReportService::new(&state.db)
        .delete(org_id, id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Scheduled report {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
