use sea_orm_migration::{prelude::*, schema::*};

use super::m20260901_000005_create_domain_table::Domain;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(pk_auto(Report::Id))
                    .col(integer(Report::DomainId))
                    .col(string(Report::OrgName))
                    .col(string_null(Report::ReporterEmail))
                    .col(string(Report::ReportId))
                    .col(timestamp_with_time_zone(Report::DateBegin))
                    .col(timestamp_with_time_zone(Report::DateEnd))
                    .col(string(Report::PolicyDomain))
                    .col(string(Report::PolicyP))
                    .col(string_null(Report::PolicySp))
                    .col(integer_null(Report::PolicyPct))
                    .col(string_null(Report::PolicyAdkim))
                    .col(string_null(Report::PolicyAspf))
                    .col(big_integer(Report::TotalCount).default(0))
                    .col(big_integer(Report::PassCount).default(0))
                    .col(big_integer(Report::FailCount).default(0))
                    .col(
                        timestamp_with_time_zone(Report::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_domain_id")
                            .from(Report::Table, Report::DomainId)
                            .to(Domain::Table, Domain::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_report_domain_reporter_unique")
                            .col(Report::DomainId)
                            .col(Report::OrgName)
                            .col(Report::ReportId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_domain_date_begin")
                    .table(Report::Table)
                    .col(Report::DomainId)
                    .col(Report::DateBegin)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Report {
    Table,
    Id,
    DomainId,
    OrgName,
    ReporterEmail,
    ReportId,
    DateBegin,
    DateEnd,
    PolicyDomain,
    PolicyP,
    PolicySp,
    PolicyPct,
    PolicyAdkim,
    PolicyAspf,
    TotalCount,
    PassCount,
    FailCount,
    CreatedAt,
}
