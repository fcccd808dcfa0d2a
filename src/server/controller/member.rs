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
        organization::{
            CreateInvitationDto, InvitationDto, MemberDto, OrganizationDto, UpdateMemberDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::organization::CreateInvitationParams,
        service::{
            invitation::InvitationService, member::MemberService,
            organization::OrganizationService,
        },
        state::AppState,
    },
};

/// Tag for grouping member and invitation endpoints in OpenAPI documentation
pub static MEMBER_TAG: &str = "member";

/// List the members of an organization.
///
/// # Access Control
/// - `OrgView` - Any member
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/members",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Members of the organization", body = Vec<MemberDto>),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_members(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgView(org_id)])
        .await?;

    let members = MemberService::new(&state.db).list(org_id).await?;

    let dtos: Vec<_> = members.into_iter().map(|m| m.into_dto()).collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Change the role of a member.
///
/// Only owners may grant or revoke the owner role and the last owner can't
/// be demoted.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    put,
    path = "/api/organizations/{org_id}/members/{user_id}",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("user_id" = i32, Path, description = "User ID of the member")
    ),
    request_body = UpdateMemberDto,
    responses(
        (status = 200, description = "Role updated", body = MemberDto),
        (status = 400, description = "Would leave the organization without an owner", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization or member not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_member(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, user_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateMemberDto>,
) -> Result<impl IntoResponse, AppError> {
    let (_, membership) = AuthGuard::new(&state.db, &session)
        .require_member(Permission::OrgManage(org_id))
        .await?;

    let service = MemberService::new(&state.db);

    service
        .update_role(&membership, user_id, payload.role)
        .await?;

    let member = service
        .list(org_id)
        .await?
        .into_iter()
        .find(|m| m.membership.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok((StatusCode::OK, Json(member.into_dto())))
}

/// Remove a member, or leave the organization when `user_id` is the caller.
///
/// # Access Control
/// - `OrgView` - Members may remove themselves
/// - `OrgManage` - Admins and owners may remove others
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/members/{user_id}",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("user_id" = i32, Path, description = "User ID of the member")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Last owner can't leave", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization or member not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn remove_member(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, user_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let (_, membership) = AuthGuard::new(&state.db, &session)
        .require_member(Permission::OrgView(org_id))
        .await?;

    MemberService::new(&state.db)
        .remove(&membership, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Invite someone into an organization by email.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
///
/// # Returns
/// - `201 Created` - Pending invitation including its accept link
/// - `400 Bad Request` - Invalid email or role, already invited or already a member
#[utoipa::path(
    post,
    path = "/api/organizations/{org_id}/invitations",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    request_body = CreateInvitationDto,
    responses(
        (status = 201, description = "Invitation created", body = InvitationDto),
        (status = 400, description = "Invalid invitation", body = ErrorDto),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_invitation(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
    Json(payload): Json<CreateInvitationDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let invitation = InvitationService::new(&state.db)
        .create(CreateInvitationParams {
            organization_id: org_id,
            email: payload.email,
            role: payload.role,
            invited_by: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(invitation.into_dto(&state.app_url))))
}

/// List pending invitations of an organization.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    get,
    path = "/api/organizations/{org_id}/invitations",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Pending invitations", body = Vec<InvitationDto>),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Organization not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_invitations(
    State(state): State<AppState>,
    session: Session,
    Path(org_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let invitations = InvitationService::new(&state.db)
        .list_pending(org_id)
        .await?;

    let dtos: Vec<_> = invitations
        .into_iter()
        .map(|i| i.into_dto(&state.app_url))
        .collect();

    Ok((StatusCode::OK, Json(dtos)))
}

/// Revoke a pending invitation.
///
/// # Access Control
/// - `OrgManage` - Admins and owners
#[utoipa::path(
    delete,
    path = "/api/organizations/{org_id}/invitations/{id}",
    tag = MEMBER_TAG,
    params(
        ("org_id" = i32, Path, description = "Organization ID"),
        ("id" = i32, Path, description = "Invitation ID")
    ),
    responses(
        (status = 204, description = "Invitation revoked"),
        (status = 403, description = "Insufficient role", body = ErrorDto),
        (status = 404, description = "Invitation not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn revoke_invitation(
    State(state): State<AppState>,
    session: Session,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    AuthGuard::new(&state.db, &session)
        .require(&[Permission::OrgManage(org_id)])
        .await?;

    let revoked = InvitationService::new(&state.db).revoke(org_id, id).await?;
    if !revoked {
        return Err(AppError::NotFound(format!("Invitation {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Accept an invitation as the logged-in user.
///
/// The user's email must match the invited address, compared
/// case-insensitively.
///
/// # Returns
/// - `200 OK` - The joined organization
/// - `400 Bad Request` - Unknown, expired or already accepted invitation, or email mismatch
/// - `401 Unauthorized` - Not logged in
#[utoipa::path(
    post,
    path = "/api/invitations/{token}/accept",
    tag = MEMBER_TAG,
    params(
        ("token" = String, Path, description = "Invitation token")
    ),
    responses(
        (status = 200, description = "Invitation accepted", body = OrganizationDto),
        (status = 400, description = "Invitation can't be accepted", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let membership = InvitationService::new(&state.db)
        .accept(&user, &token)
        .await?;

    let organization = OrganizationService::new(&state.db)
        .get(membership.organization_id, membership.role)
        .await?;

    Ok((StatusCode::OK, Json(organization.into_dto())))
}
