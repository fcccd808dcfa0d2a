//! Email invitations into an organization.

use chrono::{Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use sea_orm::DatabaseConnection;

use crate::{
    model::organization::OrgRole,
    server::{
        data::{invitation::InvitationRepository, org_member::OrgMemberRepository},
        error::{auth::AuthError, AppError},
        model::{
            organization::{CreateInvitationParams, Invitation, Membership},
            user::User,
        },
    },
};

const TOKEN_LENGTH: usize = 32;
const INVITATION_TTL_DAYS: i64 = 7;

pub struct InvitationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> InvitationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Invites `email` into the organization.
    ///
    /// # Returns
    /// - `Ok(Invitation)` - Pending invitation valid for 7 days
    /// - `Err(AppError::BadRequest)` - Invalid email or role, email already
    ///   invited, or already a member
    pub async fn create(&self, params: CreateInvitationParams) -> Result<Invitation, AppError> {
        let invitation_repo = InvitationRepository::new(self.db);

        let email = params.email.trim().to_string();
        if !is_plausible_email(&email) {
            return Err(AppError::BadRequest("A valid email address is required".to_string()));
        }
        if params.role == OrgRole::Owner {
            return Err(AppError::BadRequest(
                "Invitations may only grant the admin or member role".to_string(),
            ));
        }

        if invitation_repo
            .find_pending_by_email(params.organization_id, &email)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(format!(
                "An invitation for {} is already pending",
                email
            )));
        }

        let members = OrgMemberRepository::new(self.db)
            .list_by_organization(params.organization_id)
            .await?;
        if members.iter().any(|m| m.user.email.eq_ignore_ascii_case(&email)) {
            return Err(AppError::BadRequest(format!(
                "{} is already a member of this organization",
                email
            )));
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);
        let invitation = invitation_repo
            .create(CreateInvitationParams { email, ..params }, token, expires_at)
            .await?;

        tracing::info!(
            "User {} invited {} to organization {}",
            invitation.invited_by,
            invitation.email,
            invitation.organization_id
        );

        Ok(invitation)
    }

    pub async fn list_pending(&self, organization_id: i32) -> Result<Vec<Invitation>, AppError> {
        Ok(InvitationRepository::new(self.db)
            .list_pending(organization_id)
            .await?)
    }

    /// Revokes an invitation; returns false when it doesn't exist in the organization.
    pub async fn revoke(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        Ok(InvitationRepository::new(self.db)
            .delete(organization_id, id)
            .await?)
    }

    /// Accepts an invitation on behalf of the signed-in user.
    ///
    /// The invitation must be pending and addressed to the user's email
    /// (case-insensitive).
    ///
    /// # Returns
    /// - `Ok(Membership)` - Membership created with the invited role
    /// - `Err(AuthError::InvalidInvitation)` - Unknown, expired, accepted,
    ///   addressed to someone else, or user already a member
    pub async fn accept(&self, user: &User, token: &str) -> Result<Membership, AppError> {
        let invitation_repo = InvitationRepository::new(self.db);
        let member_repo = OrgMemberRepository::new(self.db);

        let Some(invitation) = invitation_repo.find_by_token(token).await? else {
            return Err(AuthError::InvalidInvitation("Invitation not found".to_string()).into());
        };

        if !invitation.is_pending(Utc::now()) {
            return Err(AuthError::InvalidInvitation(
                "Invitation has expired or was already used".to_string(),
            )
            .into());
        }

        if !invitation.email.eq_ignore_ascii_case(&user.email) {
            return Err(AuthError::InvalidInvitation(
                "Invitation was sent to a different email address".to_string(),
            )
            .into());
        }

        if member_repo
            .find(invitation.organization_id, user.id)
            .await?
            .is_some()
        {
            return Err(AuthError::InvalidInvitation(
                "You are already a member of this organization".to_string(),
            )
            .into());
        }

        let membership = member_repo
            .create(invitation.organization_id, user.id, invitation.role)
            .await?;
        invitation_repo.mark_accepted(invitation.id).await?;

        tracing::info!(
            "User {} joined organization {} as {}",
            user.id,
            invitation.organization_id,
            invitation.role
        );

        Ok(membership)
    }
}

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: tokens are 32 alphanumeric characters and differ between calls
    #[test]
    fn generates_random_tokens() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn checks_email_shape() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("alice@localhost"));
    }
}
