//! Organization, membership and invitation domain models.

use chrono::{DateTime, Utc};

use crate::{
    model::organization::{
        InvitationDto, MemberDto, OrgRole, OrganizationDto, Plan, SubscriptionStatus,
    },
    server::{error::internal::InternalError, model::user::User, util::parse::parse_column},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub plan: Plan,
    pub subscription_status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Converts an entity model to a domain model at the repository boundary.
    ///
    /// # Returns
    /// - `Ok(Organization)` - Converted model
    /// - `Err(InternalError::UnknownColumnValue)` - Stored plan or status not recognised
    pub fn from_entity(entity: entity::organization::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            plan: parse_column("organization.plan", &entity.plan)?,
            subscription_status: parse_column(
                "organization.subscription_status",
                &entity.subscription_status,
            )?,
            stripe_customer_id: entity.stripe_customer_id,
            stripe_subscription_id: entity.stripe_subscription_id,
            created_at: entity.created_at,
        })
    }

    /// Plan whose limits currently apply.
    ///
    /// A paid plan whose subscription was canceled falls back to the free tier.
    pub fn effective_plan(&self) -> Plan {
        match (self.plan, self.subscription_status) {
            (Plan::Free, _) => Plan::Free,
            (_, SubscriptionStatus::Canceled) => Plan::Free,
            (plan, _) => plan,
        }
    }

    pub fn domain_limit(&self) -> u64 {
        self.effective_plan().domain_limit()
    }
}

/// Organization as seen by one of its members.
#[derive(Debug, Clone)]
pub struct OrganizationWithRole {
    pub organization: Organization,
    pub role: OrgRole,
    pub domain_count: u64,
}

impl OrganizationWithRole {
    pub fn into_dto(self) -> OrganizationDto {
        let domain_limit = self.organization.domain_limit();
        OrganizationDto {
            id: self.organization.id,
            name: self.organization.name,
            slug: self.organization.slug,
            plan: self.organization.plan,
            subscription_status: self.organization.subscription_status,
            domain_limit,
            domain_count: self.domain_count,
            role: self.role,
            created_at: self.organization.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: i32,
    pub role: OrgRole,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn from_entity(entity: entity::org_member::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            user_id: entity.user_id,
            role: parse_column("org_member.role", &entity.role)?,
            created_at: entity.created_at,
        })
    }
}

/// Membership joined with the member's user profile.
#[derive(Debug, Clone)]
pub struct Member {
    pub membership: Membership,
    pub user: User,
}

impl Member {
    pub fn into_dto(self) -> MemberDto {
        MemberDto {
            id: self.membership.id,
            user_id: self.user.id,
            email: self.user.email,
            name: self.user.name,
            avatar_url: self.user.avatar_url,
            role: self.membership.role,
            joined_at: self.membership.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invitation {
    pub id: i32,
    pub organization_id: i32,
    pub email: String,
    pub role: OrgRole,
    pub token: String,
    pub invited_by: i32,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn from_entity(entity: entity::invitation::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            email: entity.email,
            role: parse_column("invitation.role", &entity.role)?,
            token: entity.token,
            invited_by: entity.invited_by,
            expires_at: entity.expires_at,
            accepted_at: entity.accepted_at,
            created_at: entity.created_at,
        })
    }

    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.accepted_at.is_none() && self.expires_at > now
    }

    /// Converts to a DTO carrying the link the invitee follows.
    ///
    /// # Arguments
    /// - `app_url` - Public base URL of the application
    pub fn into_dto(self, app_url: &str) -> InvitationDto {
        InvitationDto {
            id: self.id,
            organization_id: self.organization_id,
            accept_url: format!("{}/invitations/{}", app_url, self.token),
            email: self.email,
            role: self.role,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateInvitationParams {
    pub organization_id: i32,
    pub email: String,
    pub role: OrgRole,
    pub invited_by: i32,
}

/// Billing fields written by Stripe webhook handlers.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBillingParams {
    pub plan: Option<Plan>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(plan: Plan, status: SubscriptionStatus) -> Organization {
        Organization {
            id: 1,
            name: "Acme".into(),
            slug: "acme".into(),
            plan,
            subscription_status: status,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: Utc::now(),
        }
    }

    /// Expected: canceled paid plans use the free limit, past due keeps the paid limit
    #[test]
    fn applies_plan_limits() {
        assert_eq!(org(Plan::Free, SubscriptionStatus::None).domain_limit(), 1);
        assert_eq!(org(Plan::Pro, SubscriptionStatus::Active).domain_limit(), 10);
        assert_eq!(org(Plan::Business, SubscriptionStatus::PastDue).domain_limit(), 100);
        assert_eq!(org(Plan::Business, SubscriptionStatus::Canceled).domain_limit(), 1);
    }
}
