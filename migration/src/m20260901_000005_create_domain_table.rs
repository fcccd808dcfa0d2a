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
                    .table(Domain::Table)
                    .if_not_exists()
                    .col(pk_auto(Domain::Id))
                    .col(integer(Domain::OrganizationId))
                    .col(string(Domain::Name))
                    .col(
                        timestamp_with_time_zone(Domain::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Domain::LastReportAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_domain_organization_id")
                            .from(Domain::Table, Domain::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_domain_organization_name_unique")
                            .col(Domain::OrganizationId)
                            .col(Domain::Name),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Domain::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Domain {
    Table,
    Id,
    OrganizationId,
    Name,
    CreatedAt,
    LastReportAt,
}
