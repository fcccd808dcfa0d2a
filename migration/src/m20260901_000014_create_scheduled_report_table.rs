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
                    .table(ScheduledReport::Table)
                    .if_not_exists()
                    .col(pk_auto(ScheduledReport::Id))
                    .col(integer(ScheduledReport::OrganizationId))
                    .col(string(ScheduledReport::Frequency))
                    .col(string(ScheduledReport::WebhookUrl))
                    .col(string(ScheduledReport::WebhookKind))
                    .col(boolean(ScheduledReport::Enabled).default(true))
                    .col(timestamp_with_time_zone_null(ScheduledReport::LastSentAt))
                    .col(timestamp_with_time_zone(ScheduledReport::NextRunAt))
                    .col(
                        timestamp_with_time_zone(ScheduledReport::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scheduled_report_organization_id")
                            .from(ScheduledReport::Table, ScheduledReport::OrganizationId)
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
            .drop_table(Table::drop().table(ScheduledReport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ScheduledReport {
    Table,
    Id,
    OrganizationId,
    Frequency,
    WebhookUrl,
    WebhookKind,
    Enabled,
    LastSentAt,
    NextRunAt,
    CreatedAt,
}
