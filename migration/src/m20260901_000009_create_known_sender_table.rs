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
                    .table(KnownSender::Table)
                    .if_not_exists()
                    .col(pk_auto(KnownSender::Id))
                    .col(integer_null(KnownSender::OrganizationId))
                    .col(string(KnownSender::Name))
                    .col(string(KnownSender::HostnameSuffix))
                    .col(string_null(KnownSender::Description))
                    .col(
                        timestamp_with_time_zone(KnownSender::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_known_sender_organization_id")
                            .from(KnownSender::Table, KnownSender::OrganizationId)
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
            .drop_table(Table::drop().table(KnownSender::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum KnownSender {
    Table,
    Id,
    OrganizationId,
    Name,
    HostnameSuffix,
    Description,
    CreatedAt,
}
