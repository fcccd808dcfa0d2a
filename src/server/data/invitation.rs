use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::organization::{CreateInvitationParams, Invitation};

pub struct InvitationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> InvitationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        params: CreateInvitationParams,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, DbErr> {
        let invitation = entity::invitation::ActiveModel {
            organization_id: ActiveValue::Set(params.organization_id),
            email: ActiveValue::Set(params.email),
            role: ActiveValue::Set(params.role.as_str().to_string()),
            token: ActiveValue::Set(token),
            invited_by: ActiveValue::Set(params.invited_by),
            expires_at: ActiveValue::Set(expires_at),
            accepted_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        to_domain(invitation)
    }

    /// Lists invitations that are neither accepted nor expired, newest first.
    pub async fn list_pending(&self, organization_id: i32) -> Result<Vec<Invitation>, DbErr> {
        entity::prelude::Invitation::find()
            .filter(entity::invitation::Column::OrganizationId.eq(organization_id))
            .filter(entity::invitation::Column::AcceptedAt.is_null())
            .filter(entity::invitation::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(entity::invitation::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Finds a pending invitation for `email` (compared case-insensitively).
    pub async fn find_pending_by_email(
        &self,
        organization_id: i32,
        email: &str,
    ) -> Result<Option<Invitation>, DbErr> {
        let pending = self.list_pending(organization_id).await?;

        Ok(pending
            .into_iter()
            .find(|i| i.email.eq_ignore_ascii_case(email)))
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, DbErr> {
        entity::prelude::Invitation::find()
            .filter(entity::invitation::Column::Token.eq(token))
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn mark_accepted(&self, id: i32) -> Result<(), DbErr> {
        entity::invitation::ActiveModel {
            id: ActiveValue::Unchanged(id),
            accepted_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Deletes an invitation of the organization.
    ///
    /// # Returns
    /// - `Ok(true)` - Invitation deleted
    /// - `Ok(false)` - No such invitation in this organization
    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Invitation::delete_many()
            .filter(entity::invitation::Column::Id.eq(id))
            .filter(entity::invitation::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn to_domain(entity: entity::invitation::Model) -> Result<Invitation, DbErr> {
    Invitation::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
