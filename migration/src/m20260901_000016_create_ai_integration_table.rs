use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000002_create_organization_table::Organization;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiIntegration::Table)
                    .if_not_exists()
                    .col(pk_auto(AiIntegration::Id))
                    .col(integer_uniq(AiIntegration::OrganizationId))
                    .col(string(AiIntegration::Provider))
                    .col(text(AiIntegration::ApiKey))
                    .col(string(AiIntegration::Model))
                    .col(boolean(AiIntegration::Enabled).default(true))
                    .col(
                        timestamp_with_time_zone(AiIntegration::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(AiIntegration::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_integration_organization_id")
                            .from(AiIntegration::Table, AiIntegration::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiIntegration::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AiIntegration {
    Table,
    Id,
    OrganizationId,
    Provider,
    ApiKey,
    Model,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
