use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000006_create_report_table::Report;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Record::Table)
                    .if_not_exists()
                    .col(pk_auto(Record::Id))
                    .col(integer(Record::ReportId))
                    .col(string(Record::SourceIp))
                    .col(big_integer(Record::Count))
                    .col(string(Record::Disposition))
                    .col(string(Record::Dkim))
                    .col(string(Record::Spf))
                    .col(string(Record::HeaderFrom))
                    .col(string_null(Record::EnvelopeFrom))
                    .col(string_null(Record::DkimDomain))
                    .col(string_null(Record::DkimResult))
                    .col(string_null(Record::SpfDomain))
                    .col(string_null(Record::SpfResult))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_record_report_id")
                            .from(Record::Table, Record::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Record::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Record {
    Table,
    Id,
    ReportId,
    SourceIp,
    Count,
    Disposition,
    Dkim,
    Spf,
    HeaderFrom,
    EnvelopeFrom,
    DkimDomain,
    DkimResult,
    SpfDomain,
    SpfResult,
}
