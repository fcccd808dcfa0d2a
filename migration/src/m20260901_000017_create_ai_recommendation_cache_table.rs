use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000005_create_domain_table::Domain;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiRecommendationCache::Table)
                    .if_not_exists()
                    .col(pk_auto(AiRecommendationCache::Id))
                    .col(integer_uniq(AiRecommendationCache::DomainId))
                    .col(text(AiRecommendationCache::Content))
                    .col(string(AiRecommendationCache::Model))
                    .col(
                        timestamp_with_time_zone(AiRecommendationCache::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone(AiRecommendationCache::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_recommendation_cache_domain_id")
                            .from(AiRecommendationCache::Table, AiRecommendationCache::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AiRecommendationCache::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub enum AiRecommendationCache {
    Table,
    Id,
    DomainId,
    Content,
    Model,
    CreatedAt,
    ExpiresAt,
}
