use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::ai::{AiIntegration, UpsertAiIntegrationParams};

pub struct AiIntegrationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AiIntegrationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, organization_id: i32) -> Result<Option<AiIntegration>, DbErr> {
        let integration = entity::prelude::AiIntegration::find()
            .filter(entity::ai_integration::Column::OrganizationId.eq(organization_id))
            .one(self.db)
            .await?;

        Ok(integration.map(AiIntegration::from_entity))
    }

    /// Creates or updates the organization's Gemini integration.
    ///
    /// # Returns
    /// - `Ok(Some(integration))` - Saved integration
    /// - `Ok(None)` - No integration exists yet and no API key was given
    pub async fn upsert(
        &self,
        param: UpsertAiIntegrationParams,
    ) -> Result<Option<AiIntegration>, DbErr> {
        let now = Utc::now();
        let existing = entity::prelude::AiIntegration::find()
            .filter(entity::ai_integration::Column::OrganizationId.eq(param.organization_id))
            .one(self.db)
            .await?;

        let integration = match (existing, param.api_key) {
            (Some(existing), api_key) => {
                let mut active: entity::ai_integration::ActiveModel = existing.into();
                if let Some(api_key) = api_key {
                    active.api_key = ActiveValue::Set(api_key);
                }
                active.model = ActiveValue::Set(param.model);
                active.enabled = ActiveValue::Set(param.enabled);
                active.updated_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            (None, Some(api_key)) => {
                entity::ai_integration::ActiveModel {
                    organization_id: ActiveValue::Set(param.organization_id),
                    provider: ActiveValue::Set("gemini".to_string()),
                    api_key: ActiveValue::Set(api_key),
                    model: ActiveValue::Set(param.model),
                    enabled: ActiveValue::Set(param.enabled),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
            (None, None) => return Ok(None),
        };

        Ok(Some(AiIntegration::from_entity(integration)))
    }

    pub async fn delete(&self, organization_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::AiIntegration::delete_many()
            .filter(entity::ai_integration::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
