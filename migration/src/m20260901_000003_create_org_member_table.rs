use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260901_000001_create_user_table::User,
    m20260901_000002_create_organization_table::Organization,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrgMember::Table)
                    .if_not_exists()
                    .col(pk_auto(OrgMember::Id))
                    .col(integer(OrgMember::OrganizationId))
                    .col(integer(OrgMember::UserId))
                    .col(string(OrgMember::Role))
                    .col(
                        timestamp_with_time_zone(OrgMember::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_member_organization_id")
                            .from(OrgMember::Table, OrgMember::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_member_user_id")
                            .from(OrgMember::Table, OrgMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_org_member_unique")
                            .col(OrgMember::OrganizationId)
                            .col(OrgMember::UserId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrgMember::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OrgMember {
    Table,
    Id,
    OrganizationId,
    UserId,
    Role,
    CreatedAt,
}
