use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;
use utoipa::IntoParams;

use crate::{
    model::{
        alert::{AlertDto, AlertRuleDto, CreateAlertRuleDto, UpdateAlertRuleDto},
        api::ErrorDto,
        pagination::PageDto,
    },
    server::{
        controller::{default_entries, MAX_ENTRIES},
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::alert::{CreateAlertRuleParams, UpdateAlertRuleParams},
        service::alert::AlertService,
        state::AppState,
    },
};

/// Tag for grouping alert endpoints in OpenAPI documentation
pub static ALERT_TAG: &str = "alert";

#[derive(Deserialize, IntoParams)]
pub struct AlertListParams {
    /// Only return alerts that were not read yet
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

/// Get a page of the organization's alerts, newest first.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/alerts",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        AlertListParams
    ),
    responses(
        (status = 200, description = "Page of alerts", body = PageDto<AlertDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Query(params): Query<AlertListParams>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let alerts = AlertService::new(&state.db)
        .list_alerts(org_id, params.unread, params.page, params.entries.clamp(1, MAX_ENTRIES))
        .await?;

    Ok((StatusCode::OK, Json(alerts.into_dto(|a| a.into_dto()))))
}

/// Mark one alert as read.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/alerts/{id}/read",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Alert ID")
    ),
    responses(
        (status = 204, description = "Alert marked as read"),
        (status = 404, description = "Alert not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_alert_read(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let updated = AlertService::new(&state.db).mark_read(org_id, id).await?;
    if !updated {
        return Err(AppError::NotFound(format!("Alert {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Mark every alert of the organization as read.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/alerts/read-all",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 204, description = "Alerts marked as read"),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_all_alerts_read(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    AlertService::new(&state.db).mark_all_read(org_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the organization's alert rules.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/alert-rules",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Alert rules", body = Vec<AlertRuleDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_alert_rules(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let rules = AlertService::new(&state.db).list_rules(org_id).await?;

    let dtos: Vec<_> = rules.into_iter().map(|r| r.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Create an alert rule, optionally limited to one domain.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/alert-rules",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CreateAlertRuleDto,
    responses(
        (status = 201, description = "Rule created", body = AlertRuleDto),
        (status = 400, description = "Invalid threshold, domain or webhook", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_alert_rule(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CreateAlertRuleDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let rule = AlertService::new(&state.db)
        .create_rule(CreateAlertRuleParams {
            organization_id: org_id,
            domain_id: payload.domain_id,
            kind: payload.kind,
            threshold: payload.threshold,
            enabled: payload.enabled,
            webhook_url: payload.webhook_url,
            webhook_kind: payload.webhook_kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(rule.into_dto())))
}

/// Update the threshold, state and webhook of an alert rule.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    put,
    path = "/api/organizations/{org_id}/alert-rules/{id}",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Alert rule ID")
    ),
    request_body = UpdateAlertRuleDto,
    responses(
        (status = 200, description = "Rule updated", body = AlertRuleDto),
        (status = 400, description = "Invalid threshold or webhook", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Rule not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_alert_rule(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateAlertRuleDto>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let rule = AlertService::new(&state.db)
        .update_rule(UpdateAlertRuleParams {
            id,
            organization_id: org_id,
            threshold: payload.threshold,
            enabled: payload.enabled,
            webhook_url: payload.webhook_url,
            webhook_kind: payload.webhook_kind,
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert rule {} not found", id)))?;

    Ok((StatusCode::OK, Json(rule.into_dto())))
}

/// Delete an alert rule.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/alert-rules/{id}",
    tag = ALERT_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Alert rule ID")
    ),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Rule not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_alert_rule(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let deleted = AlertService::new(&state.db).delete_rule(org_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Alert rule {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
