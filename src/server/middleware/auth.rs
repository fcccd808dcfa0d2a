use sea_orm::DatabaseConnection;
use tower_sessions::Session;

use crate::{
    model::organization::OrgRole,
    server::{
        data::{
            domain::DomainRepository, org_member::OrgMemberRepository, report::ReportRepository,
            user::UserRepository,
        },
        error::{auth::AuthError, AppError},
        middleware::session::AuthSession,
        model::{domain::Domain, organization::Membership, report::Report, user::User},
    },
};

/// Organization-level permission checked against the user's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Any member of the organization
    OrgView(i32),
    /// Admins and owners
    OrgManage(i32),
    /// Owners only
    OrgOwner(i32),
}

impl Permission {
    pub fn organization_id(&self) -> i32 {
        match self {
            Self::OrgView(id) | Self::OrgManage(id) | Self::OrgOwner(id) => *id,
        }
    }

    fn allows(&self, role: OrgRole) -> bool {
        match self {
            Self::OrgView(_) => true,
            Self::OrgManage(_) => role.can_manage(),
            Self::OrgOwner(_) => role == OrgRole::Owner,
        }
    }
}

/// Role required on the organization owning a domain or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    View,
    Manage,
    Owner,
}

impl AccessLevel {
    pub fn on(self, organization_id: i32) -> Permission {
        match self {
            Self::View => Permission::OrgView(organization_id),
            Self::Manage => Permission::OrgManage(organization_id),
            Self::Owner => Permission::OrgOwner(organization_id),
        }
    }
}

pub struct AuthGuard<'a> {
    db: &'a DatabaseConnection,
    session: &'a Session,
}

impl<'a> AuthGuard<'a> {
    pub fn new(db: &'a DatabaseConnection, session: &'a Session) -> Self {
        Self { db, session }
    }

    /// Resolves the logged-in user and checks every permission.
    ///
    /// A user who is not a member of an organization gets the same error as
    /// for an organization that doesn't exist.
    ///
    /// # Returns
    /// - `Ok(User)` - All permissions granted
    /// - `Err(AuthError::UserNotInSession)` - Not logged in (401)
    /// - `Err(AuthError::UserNotInDatabase)` - Session user was deleted (401)
    /// - `Err(AuthError::OrganizationNotFound)` - Not a member (404)
    /// - `Err(AuthError::AccessDenied)` - Member without the required role (403)
    pub async fn require(&self, permissions: &[Permission]) -> Result<User, AppError> {
        let user = self.user().await?;

        for permission in permissions {
            self.check(&user, *permission).await?;
        }

        Ok(user)
    }

    /// Like [`require`](Self::require) for a single permission, also returning the membership.
    pub async fn require_member(
        &self,
        permission: Permission,
    ) -> Result<(User, Membership), AppError> {
        let user = self.user().await?;
        let membership = self.check(&user, permission).await?;

        Ok((user, membership))
    }

    /// Loads a domain and checks `level` on its organization.
    ///
    /// # Returns
    /// - `Ok((User, Membership, Domain))` - Access granted
    /// - `Err(AppError::NotFound)` - Domain doesn't exist or user is not a member
    /// - `Err(AuthError::AccessDenied)` - Member without the required role
    pub async fn require_domain(
        &self,
        domain_id: i32,
        level: AccessLevel,
    ) -> Result<(User, Membership, Domain), AppError> {
        let user = self.user().await?;
        let not_found = || AppError::NotFound(format!("Domain {} not found", domain_id));

        let domain = DomainRepository::new(self.db)
            .find_by_id(domain_id)
            .await?
            .ok_or_else(not_found)?;

        let membership = match self.check(&user, level.on(domain.organization_id)).await {
            Err(AppError::AuthErr(AuthError::OrganizationNotFound(_))) => return Err(not_found()),
            other => other?,
        };

        Ok((user, membership, domain))
    }

    /// Loads a report and checks `level` on the organization owning its domain.
    pub async fn require_report(
        &self,
        report_id: i32,
        level: AccessLevel,
    ) -> Result<(User, Report, Domain), AppError> {
        let not_found = || AppError::NotFound(format!("Report {} not found", report_id));

        let report = ReportRepository::new(self.db)
            .find_by_id(report_id)
            .await?
            .ok_or_else(not_found)?;

        let (user, _, domain) = match self.require_domain(report.domain_id, level).await {
            Err(AppError::NotFound(_)) => return Err(not_found()),
            other => other?,
        };

        Ok((user, report, domain))
    }

    async fn user(&self) -> Result<User, AppError> {
        let Some(user_id) = AuthSession::new(self.session).get_user_id().await? else {
            return Err(AuthError::UserNotInSession.into());
        };

        let Some(user) = UserRepository::new(self.db).find_by_id(user_id).await? else {
            return Err(AuthError::UserNotInDatabase(user_id).into());
        };

        Ok(user)
    }

    async fn check(&self, user: &User, permission: Permission) -> Result<Membership, AppError> {
        let organization_id = permission.organization_id();

        let Some(membership) = OrgMemberRepository::new(self.db)
            .find(organization_id, user.id)
            .await?
        else {
            return Err(AuthError::OrganizationNotFound(organization_id).into());
        };

        if !permission.allows(membership.role) {
            return Err(AuthError::AccessDenied(
                user.id,
                format!(
                    "{:?} requires a higher role than {} in organization {}",
                    permission, membership.role, organization_id
                ),
            )
            .into());
        }

        Ok(membership)
    }
}
