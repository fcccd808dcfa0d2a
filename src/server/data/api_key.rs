use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::api_key::{ApiKey, CreateApiKeyParams};

pub struct ApiKeyRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ApiKeyRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateApiKeyParams) -> Result<ApiKey, DbErr> {
        let key = entity::api_key::ActiveModel {
            organization_id: ActiveValue::Set(param.organization_id),
            name: ActiveValue::Set(param.name),
            prefix: ActiveValue::Set(param.prefix),
            key_hash: ActiveValue::Set(param.key_hash),
            created_by: ActiveValue::Set(param.created_by),
            created_at: ActiveValue::Set(Utc::now()),
            last_used_at: ActiveValue::Set(None),
            revoked_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(ApiKey::from_entity(key))
    }

    /// Lists all keys of an organization including revoked ones, newest first.
    pub async fn list_by_organization(&self, organization_id: i32) -> Result<Vec<ApiKey>, DbErr> {
        let keys = entity::prelude::ApiKey::find()
            .filter(entity::api_key::Column::OrganizationId.eq(organization_id))
            .order_by_desc(entity::api_key::Column::CreatedAt)
            .order_by_desc(entity::api_key::Column::Id)
            .all(self.db)
            .await?;

        Ok(keys.into_iter().map(ApiKey::from_entity).collect())
    }

    /// Finds a non-revoked key by the hash of its secret.
    pub async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbErr> {
        let key = entity::prelude::ApiKey::find()
            .filter(entity::api_key::Column::KeyHash.eq(key_hash))
            .filter(entity::api_key::Column::RevokedAt.is_null())
            .one(self.db)
            .await?;

        Ok(key.map(ApiKey::from_entity))
    }

    pub async fn touch(&self, id: i32) -> Result<(), DbErr> {
        entity::api_key::ActiveModel {
            id: ActiveValue::Unchanged(id),
            last_used_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Revokes a key of the organization. Revoking twice keeps the first timestamp.
    ///
    /// # Returns
    /// - `Ok(true)` - Key exists in the organization
    /// - `Ok(false)` - Key not found
    pub async fn revoke(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let Some(key) = entity::prelude::ApiKey::find_by_id(id)
            .filter(entity::api_key::Column::OrganizationId.eq(organization_id))
            .one(self.db)
            .await?
        else {
            return Ok(false);
        };

        if key.revoked_at.is_none() {
            let mut active: entity::api_key::ActiveModel = key.into();
            active.revoked_at = ActiveValue::Set(Some(Utc::now()));
            active.update(self.db).await?;
        }

        Ok(true)
    }
}
