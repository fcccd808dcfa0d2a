//! Membership management with the owner-protection rules.

use sea_orm::DatabaseConnection;

use crate::{
    model::organization::OrgRole,
    server::{
        data::org_member::OrgMemberRepository,
        error::{auth::AuthError, AppError},
        model::organization::{Member, Membership},
    },
};

pub struct MemberService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MemberService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, organization_id: i32) -> Result<Vec<Member>, AppError> {
        let repo = OrgMemberRepository::new(self.db);

        Ok(repo.list_by_organization(organization_id).await?)
    }

    /// Changes the role of `user_id` in the organization.
    ///
    /// Only owners may grant or revoke the owner role, and the last owner
    /// can't be demoted.
    ///
    /// # Arguments
    /// - `actor` - Membership of the user performing the change (admin or owner)
    /// - `user_id` - User whose role is changed
    /// - `role` - New role
    ///
    /// # Returns
    /// - `Ok(Membership)` - Updated membership
    /// - `Err(AppError::NotFound)` - User is not a member
    /// - `Err(AuthError::AccessDenied)` - Owner role change by a non-owner
    /// - `Err(AppError::BadRequest)` - Would leave the organization without an owner
    pub async fn update_role(
        &self,
        actor: &Membership,
        user_id: i32,
        role: OrgRole,
    ) -> Result<Membership, AppError> {
        let repo = OrgMemberRepository::new(self.db);

        let target = repo
            .find(actor.organization_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        if target.role == role {
            return Ok(target);
        }

        let touches_owner = target.role == OrgRole::Owner || role == OrgRole::Owner;
        if touches_owner && actor.role != OrgRole::Owner {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                format!(
                    "Only owners may change owner roles in organization {}",
                    actor.organization_id
                ),
            )
            .into());
        }

        if target.role == OrgRole::Owner {
            self.ensure_not_last_owner(actor.organization_id).await?;
        }

        let updated = repo.update_role(target.id, role).await?;

        tracing::info!(
            "User {} changed role of user {} in organization {} to {}",
            actor.user_id,
            user_id,
            actor.organization_id,
            role
        );

        Ok(updated)
    }

    /// Removes `user_id` from the organization.
    ///
    /// Admins and owners may remove others; any member may remove themselves.
    /// Owners can only be removed by owners and the last owner can't leave.
    pub async fn remove(&self, actor: &Membership, user_id: i32) -> Result<(), AppError> {
        let repo = OrgMemberRepository::new(self.db);

        let leaving = actor.user_id == user_id;
        if !leaving && !actor.role.can_manage() {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                format!(
                    "Removing members of organization {} requires admin role",
                    actor.organization_id
                ),
            )
            .into());
        }

        let target = repo
            .find(actor.organization_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        if target.role == OrgRole::Owner {
            if !leaving && actor.role != OrgRole::Owner {
                return Err(AuthError::AccessDenied(
                    actor.user_id,
                    format!(
                        "Only owners may remove owners of organization {}",
                        actor.organization_id
                    ),
                )
                .into());
            }
            self.ensure_not_last_owner(actor.organization_id).await?;
        }

        repo.delete(target.id).await?;

        tracing::info!(
            "User {} removed user {} from organization {}",
            actor.user_id,
            user_id,
            actor.organization_id
        );

        Ok(())
    }

    async fn ensure_not_last_owner(&self, organization_id: i32) -> Result<(), AppError> {
        let owners = OrgMemberRepository::new(self.db)
            .count_with_role(organization_id, OrgRole::Owner)
            .await?;

        if owners <= 1 {
            return Err(AppError::BadRequest(
                "An organization must keep at least one owner".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_utils::{builder::TestBuilder, factory};

    use super::*;

    async fn membership(
        db: &DatabaseConnection,
        organization_id: i32,
        user_id: i32,
    ) -> Result<Membership, AppError> {
        OrgMemberRepository::new(db)
            .find(organization_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }

    #[tokio::test]
    async fn last_owner_cannot_be_demoted_or_leave() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_organization_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let actor = membership(db, organization.id, owner.id).await?;

        let service = MemberService::new(db);

        let demote = service.update_role(&actor, owner.id, OrgRole::Admin).await;
        assert!(matches!(demote, Err(AppError::BadRequest(_))));

        let leave = service.remove(&actor, owner.id).await;
        assert!(matches!(leave, Err(AppError::BadRequest(_))));

        Ok(())
    }

    #[tokio::test]
    async fn admin_cannot_touch_owner_roles() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_organization_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let admin = factory::user::create_user(db).await?;
        let member = factory::user::create_user(db).await?;
        factory::org_member::create_member(db, organization.id, admin.id, "admin").await?;
        factory::org_member::create_member(db, organization.id, member.id, "member").await?;
        let actor = membership(db, organization.id, admin.id).await?;

        let service = MemberService::new(db);

        let promote = service.update_role(&actor, member.id, OrgRole::Owner).await;
        assert!(matches!(
            promote,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));

        let remove_owner = service.remove(&actor, owner.id).await;
        assert!(matches!(
            remove_owner,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));

        let promoted = service.update_role(&actor, member.id, OrgRole::Admin).await?;
        assert_eq!(promoted.role, OrgRole::Admin);

        Ok(())
    }

    #[tokio::test]
    async fn member_may_leave_but_not_remove_others() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_organization_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let first = factory::user::create_user(db).await?;
        let second = factory::user::create_user(db).await?;
        factory::org_member::create_member(db, organization.id, first.id, "member").await?;
        factory::org_member::create_member(db, organization.id, second.id, "member").await?;
        let actor = membership(db, organization.id, first.id).await?;

        let service = MemberService::new(db);

        let kick = service.remove(&actor, second.id).await;
        assert!(matches!(
            kick,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));

        service.remove(&actor, first.id).await?;
        assert_eq!(service.list(organization.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn second_owner_allows_demotion() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_organization_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (owner, organization, _) = factory::helpers::create_owner_with_organization(db).await?;
        let co_owner = factory::user::create_user(db).await?;
        factory::org_member::create_member(db, organization.id, co_owner.id, "owner").await?;
        let actor = membership(db, organization.id, owner.id).await?;

        let updated = MemberService::new(db)
            .update_role(&actor, co_owner.id, OrgRole::Member)
            .await?;

        assert_eq!(updated.role, OrgRole::Member);

        Ok(())
    }
}
