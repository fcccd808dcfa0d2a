use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260901_000005_create_domain_table::Domain,
    m20260901_000009_create_known_sender_table::KnownSender,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Source::Table)
                    .if_not_exists()
                    .col(pk_auto(Source::Id))
                    .col(integer(Source::DomainId))
                    .col(string(Source::Ip))
                    .col(string_null(Source::Hostname))
                    .col(string_null(Source::Country))
                    .col(string_null(Source::City))
                    .col(string_null(Source::Isp))
                    .col(integer_null(Source::KnownSenderId))
                    .col(big_integer(Source::TotalCount).default(0))
                    .col(big_integer(Source::PassCount).default(0))
                    .col(timestamp_with_time_zone(Source::FirstSeen))
                    .col(timestamp_with_time_zone(Source::LastSeen))
                    .col(timestamp_with_time_zone_null(Source::GeoCheckedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_source_domain_id")
                            .from(Source::Table, Source::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_source_known_sender_id")
                            .from(Source::Table, Source::KnownSenderId)
                            .to(KnownSender::Table, KnownSender::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_source_domain_ip_unique")
                            .col(Source::DomainId)
                            .col(Source::Ip),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Source::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Source {
    Table,
    Id,
    DomainId,
    Ip,
    Hostname,
    Country,
    City,
    Isp,
    KnownSenderId,
    TotalCount,
    PassCount,
    FirstSeen,
    LastSeen,
    GeoCheckedAt,
}
