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
                    .table(GmailAccount::Table)
                    .if_not_exists()
                    .col(pk_auto(GmailAccount::Id))
                    .col(integer(GmailAccount::OrganizationId))
                    .col(string(GmailAccount::Email))
                    .col(text(GmailAccount::AccessToken))
                    .col(text_null(GmailAccount::RefreshToken))
                    .col(timestamp_with_time_zone_null(GmailAccount::TokenExpiresAt))
                    .col(string(GmailAccount::SyncStatus).default("idle"))
                    .col(timestamp_with_time_zone_null(GmailAccount::LastSyncAt))
                    .col(text_null(GmailAccount::LastError))
                    .col(
                        timestamp_with_time_zone(GmailAccount::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gmail_account_organization_id")
                            .from(GmailAccount::Table, GmailAccount::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_gmail_account_organization_email_unique")
                            .col(GmailAccount::OrganizationId)
                            .col(GmailAccount::Email),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GmailAccount::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GmailAccount {
    Table,
    Id,
    OrganizationId,
    Email,
    AccessToken,
    RefreshToken,
    TokenExpiresAt,
    SyncStatus,
    LastSyncAt,
    LastError,
    CreatedAt,
}
