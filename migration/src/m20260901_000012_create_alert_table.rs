use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260901_000002_create_organization_table::Organization,
    m20260901_000005_create_domain_table::Domain,
    m20260901_000011_create_alert_rule_table::AlertRule,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(pk_auto(Alert::Id))
                    .col(integer(Alert::OrganizationId))
                    .col(integer_null(Alert::DomainId))
                    .col(integer_null(Alert::RuleId))
                    .col(string(Alert::Kind))
                    .col(string(Alert::Severity))
                    .col(text(Alert::Message))
                    .col(boolean(Alert::Read).default(false))
                    .col(
                        timestamp_with_time_zone(Alert::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_organization_id")
                            .from(Alert::Table, Alert::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_domain_id")
                            .from(Alert::Table, Alert::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_rule_id")
                            .from(Alert::Table, Alert::RuleId)
                            .to(AlertRule::Table, AlertRule::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Alert {
    Table,
    Id,
    OrganizationId,
    DomainId,
    RuleId,
    Kind,
    Severity,
    Message,
    Read,
    CreatedAt,
}
