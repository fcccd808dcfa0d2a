use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::ai::AiRecommendation;

pub struct AiRecommendationCacheRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AiRecommendationCacheRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cached answer for the domain that hasn't expired at `now`.
    pub async fn find_valid(
        &self,
        domain_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<AiRecommendation>, DbErr> {
        let cached = entity::prelude::AiRecommendationCache::find()
            .filter(entity::ai_recommendation_cache::Column::DomainId.eq(domain_id))
            .filter(entity::ai_recommendation_cache::Column::ExpiresAt.gt(now))
            .one(self.db)
            .await?;

        Ok(cached.map(|c| AiRecommendation::from_entity(c, true)))
    }

    /// Replaces the cached answer of a domain.
    pub async fn upsert(
        &self,
        domain_id: i32,
        model: String,
        content: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<AiRecommendation, DbErr> {
        let existing = entity::prelude::AiRecommendationCache::find()
            .filter(entity::ai_recommendation_cache::Column::DomainId.eq(domain_id))
            .one(self.db)
            .await?;

        let cached = match existing {
            Some(existing) => {
                let mut active: entity::ai_recommendation_cache::ActiveModel = existing.into();
                active.content = ActiveValue::Set(content);
                active.model = ActiveValue::Set(model);
                active.created_at = ActiveValue::Set(created_at);
                active.expires_at = ActiveValue::Set(expires_at);
                active.update(self.db).await?
            }
            None => {
                entity::ai_recommendation_cache::ActiveModel {
                    domain_id: ActiveValue::Set(domain_id),
                    content: ActiveValue::Set(content),
                    model: ActiveValue::Set(model),
                    created_at: ActiveValue::Set(created_at),
                    expires_at: ActiveValue::Set(expires_at),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(AiRecommendation::from_entity(cached, false))
    }
}
