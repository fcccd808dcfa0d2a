use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260901_000002_create_organization_table::Organization,
    m20260901_000005_create_domain_table::Domain,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertRule::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertRule::Id))
                    .col(integer(AlertRule::OrganizationId))
                    .col(integer_null(AlertRule::DomainId))
                    .col(string(AlertRule::Kind))
                    .col(double_null(AlertRule::Threshold))
                    .col(boolean(AlertRule::Enabled).default(true))
                    .col(string_null(AlertRule::WebhookUrl))
                    .col(string_null(AlertRule::WebhookKind))
                    .col(timestamp_with_time_zone_null(AlertRule::LastTriggeredAt))
                    .col(
                        timestamp_with_time_zone(AlertRule::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_rule_organization_id")
                            .from(AlertRule::Table, AlertRule::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_rule_domain_id")
                            .from(AlertRule::Table, AlertRule::DomainId)
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
            .drop_table(Table::drop().table(AlertRule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AlertRule {
    Table,
    Id,
    OrganizationId,
    DomainId,
    Kind,
    Threshold,
    Enabled,
    WebhookUrl,
    WebhookKind,
    LastTriggeredAt,
    CreatedAt,
}
