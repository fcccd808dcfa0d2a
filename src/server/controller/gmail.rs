use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        gmail::{GmailAccountDto, GmailSyncResultDto},
    },
    server::{
        controller::auth::{validate_csrf, CallbackParams},
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            session::{CsrfSession, GmailFlowSession},
        },
        service::{gmail::GmailService, ingest::IngestService},
        state::AppState,
    },
};

/// Tag for grouping Gmail endpoints in OpenAPI documentation
pub static GMAIL_TAG: &str = "gmail";

/// Start connecting a Gmail mailbox that receives DMARC reports.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
///
/// # Returns
/// - `307 Temporary Redirect` - To the Google consent screen
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/gmail/connect",
    tag = GMAIL_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 307, description = "Redirect to Google consent"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn connect_gmail(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let (url, csrf_token) =
        GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client).connect_url();

    CsrfSession::new(&session)
        .set_token(csrf_token.secret().clone())
        .await?;
    GmailFlowSession::new(&session)
        .set_organization_id(org_id)
        .await?;

    Ok(Redirect::temporary(url.as_str()))
}

/// Complete connecting a Gmail mailbox.
///
/// # Returns
/// - `307 Temporary Redirect` - Back to the application
/// - `400 Bad Request` - CSRF mismatch, no connect flow in progress or rejected code
#[utoipa::path(
    get,
    path = "/api/gmail/callback",
    tag = GMAIL_TAG,
    params(
        ("state" = String, Query, description = "CSRF state returned by Google"),
        ("code" = String, Query, description = "Authorization code")
    ),
    responses(
        (status = 307, description = "Mailbox connected, redirect to the application"),
        (status = 400, description = "Connect flow could not be completed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn gmail_callback(
    State(state): State<AppState>,
    session: Session,
    params: Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    validate_csrf(&session, &params.0.state).await?;

    let org_id = GmailFlowSession::new(&session)
        .take_organization_id()
        .await?
        .ok_or_else(|| AppError::BadRequest("No Gmail connection in progress".to_string()))?;

    // Role may have changed while the user was on the consent screen
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client)
        .complete_connect(org_id, params.0.code)
        .await?;

    Ok(Redirect::temporary(&state.app_url))
}

/// List the organization's connected mailboxes.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/gmail",
    tag = GMAIL_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Connected mailboxes with sync status", body = Vec<GmailAccountDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_gmail_accounts(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let accounts = GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client)
        .list(org_id)
        .await?;

    let dtos: Vec<_> = accounts.into_iter().map(|a| a.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Disconnect a mailbox.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/gmail/{id}",
    tag = GMAIL_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Gmail account ID")
    ),
    responses(
        (status = 204, description = "Mailbox disconnected"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Mailbox not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_gmail_account(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let deleted = GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client)
        .delete(org_id, id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Gmail account {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch and ingest new report mail of a mailbox now.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
///
/// # Returns
/// - `200 OK` - Counts of processed messages and reports
/// - `400 Bad Request` - A sync of the mailbox is already running
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/gmail/{id}/sync",
    tag = GMAIL_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Gmail account ID")
    ),
    responses(
        (status = 200, description = "Sync finished", body = GmailSyncResultDto),
        (status = 400, description = "Sync already in progress", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Mailbox not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn sync_gmail_account(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let ingest = IngestService::new(
        &state.db,
        &state.http_client,
        &state.discord_http,
        &state.app_url,
    );
    let result = GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client)
        .sync(org_id, id, &ingest)
        .await?;

    Ok((StatusCode::OK, Json(result.into_dto())))
}
