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
                    .table(ForensicReport::Table)
                    .if_not_exists()
                    .col(pk_auto(ForensicReport::Id))
                    .col(integer(ForensicReport::DomainId))
                    .col(string(ForensicReport::FeedbackType))
                    .col(string(ForensicReport::ReportedDomain))
                    .col(string_null(ForensicReport::SourceIp))
                    .col(string_null(ForensicReport::ArrivalDate))
                    .col(string_null(ForensicReport::OriginalMailFrom))
                    .col(string_null(ForensicReport::OriginalRcptTo))
                    .col(string_null(ForensicReport::Subject))
                    .col(string_null(ForensicReport::AuthFailure))
                    .col(string_null(ForensicReport::AuthenticationResults))
                    .col(string_null(ForensicReport::DeliveryResult))
                    .col(string_null(ForensicReport::DkimDomain))
                    .col(text_null(ForensicReport::RawHeaders))
                    .col(
                        timestamp_with_time_zone(ForensicReport::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forensic_report_domain_id")
                            .from(ForensicReport::Table, ForensicReport::DomainId)
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
            .drop_table(Table::drop().table(ForensicReport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ForensicReport {
    Table,
    Id,
    DomainId,
    FeedbackType,
    ReportedDomain,
    SourceIp,
    ArrivalDate,
    OriginalMailFrom,
    OriginalRcptTo,
    Subject,
    AuthFailure,
    AuthenticationResults,
    DeliveryResult,
    DkimDomain,
    RawHeaders,
    CreatedAt,
}
