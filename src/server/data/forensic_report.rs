use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::report::{ForensicReport, ParsedForensicReport};

pub struct ForensicReportRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ForensicReportRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        domain_id: i32,
        parsed: ParsedForensicReport,
    ) -> Result<ForensicReport, DbErr> {
        let report = entity::forensic_report::ActiveModel {
            domain_id: ActiveValue::Set(domain_id),
            feedback_type: ActiveValue::Set(parsed.feedback_type),
            reported_domain: ActiveValue::Set(parsed.reported_domain),
            source_ip: ActiveValue::Set(parsed.source_ip),
            arrival_date: ActiveValue::Set(parsed.arrival_date),
            original_mail_from: ActiveValue::Set(parsed.original_mail_from),
            original_rcpt_to: ActiveValue::Set(parsed.original_rcpt_to),
            subject: ActiveValue::Set(parsed.subject),
            auth_failure: ActiveValue::Set(parsed.auth_failure),
            authentication_results: ActiveValue::Set(parsed.authentication_results),
            delivery_result: ActiveValue::Set(parsed.delivery_result),
            dkim_domain: ActiveValue::Set(parsed.dkim_domain),
            raw_headers: ActiveValue::Set(parsed.raw_headers),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(ForensicReport::from_entity(report))
    }

    /// Gets a page of a domain's forensic reports, newest first.
    pub async fn get_by_domain_paginated(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ForensicReport>, u64), DbErr> {
        let paginator = entity::prelude::ForensicReport::find()
            .filter(entity::forensic_report::Column::DomainId.eq(domain_id))
            .order_by_desc(entity::forensic_report::Column::CreatedAt)
            .order_by_desc(entity::forensic_report::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let reports = paginator.fetch_page(page).await?;

        Ok((
            reports.into_iter().map(ForensicReport::from_entity).collect(),
            total,
        ))
    }
}
