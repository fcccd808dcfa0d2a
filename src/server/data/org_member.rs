use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    model::organization::OrgRole,
    server::model::{
        organization::{Member, Membership},
        user::User,
    },
};

pub struct OrgMemberRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrgMemberRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        organization_id: i32,
        user_id: i32,
        role: OrgRole,
    ) -> Result<Membership, DbErr> {
        let member = entity::org_member::ActiveModel {
            organization_id: ActiveValue::Set(organization_id),
            user_id: ActiveValue::Set(user_id),
            role: ActiveValue::Set(role.as_str().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        to_domain(member)
    }

    /// Finds the membership of a user in an organization.
    pub async fn find(
        &self,
        organization_id: i32,
        user_id: i32,
    ) -> Result<Option<Membership>, DbErr> {
        entity::prelude::OrgMember::find()
            .filter(entity::org_member::Column::OrganizationId.eq(organization_id))
            .filter(entity::org_member::Column::UserId.eq(user_id))
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    /// Lists members with their user profiles, oldest membership first.
    pub async fn list_by_organization(&self, organization_id: i32) -> Result<Vec<Member>, DbErr> {
        let rows = entity::prelude::OrgMember::find()
            .filter(entity::org_member::Column::OrganizationId.eq(organization_id))
            .find_also_related(entity::prelude::User)
            .order_by_asc(entity::org_member::Column::CreatedAt)
            .all(self.db)
            .await?;

        rows.into_iter()
            .filter_map(|(membership, user)| user.map(|u| (membership, u)))
            .map(|(membership, user)| {
                Ok(Member {
                    membership: to_domain(membership)?,
                    user: User::from_entity(user),
                })
            })
            .collect()
    }

    /// Ids of every organization the user belongs to.
    pub async fn organization_ids_for_user(&self, user_id: i32) -> Result<Vec<i32>, DbErr> {
        let rows = entity::prelude::OrgMember::find()
            .filter(entity::org_member::Column::UserId.eq(user_id))
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(|m| m.organization_id).collect())
    }

    pub async fn count_with_role(&self, organization_id: i32, role: OrgRole) -> Result<u64, DbErr> {
        entity::prelude::OrgMember::find()
            .filter(entity::org_member::Column::OrganizationId.eq(organization_id))
            .filter(entity::org_member::Column::Role.eq(role.as_str()))
            .count(self.db)
            .await
    }

    pub async fn update_role(&self, id: i32, role: OrgRole) -> Result<Membership, DbErr> {
        let member = entity::org_member::ActiveModel {
            id: ActiveValue::Unchanged(id),
            role: ActiveValue::Set(role.as_str().to_string()),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        to_domain(member)
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::OrgMember::delete_by_id(id)
            .exec(self.db)
            .await?;

        Ok(())
    }
}

fn to_domain(entity: entity::org_member::Model) -> Result<Membership, DbErr> {
    Membership::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
