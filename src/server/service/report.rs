use sea_orm::DatabaseConnection;

use crate::server::{
    data::{forensic_report::ForensicReportRepository, report::ReportRepository},
    error::AppError,
    model::{
        pagination::Paginated,
        report::{ForensicReport, Report, ReportDetail},
    },
};

pub struct ReportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a page of a domain's aggregate reports, newest first.
    pub async fn list(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Report>, AppError> {
        let (reports, total) = ReportRepository::new(self.db)
            .get_by_domain_paginated(domain_id, page, per_page)
            .await?;

        Ok(Paginated::new(reports, total, page, per_page))
    }

    /// Loads the records of an already authorized report.
    pub async fn detail(&self, report: Report) -> Result<ReportDetail, AppError> {
        let records = ReportRepository::new(self.db).get_records(report.id).await?;

        Ok(ReportDetail { report, records })
    }

    pub async fn delete(&self, report: &Report) -> Result<(), AppError> {
        ReportRepository::new(self.db).delete(report.id).await?;

        tracing::info!(
            "Deleted report {} ({}) of domain {}",
            report.id,
            report.report_id,
            report.domain_id
        );

        Ok(())
    }

    pub async fn list_forensic(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<ForensicReport>, AppError> {
        let (reports, total) = ForensicReportRepository::new(self.db)
            .get_by_domain_paginated(domain_id, page, per_page)
            .await?;

        Ok(Paginated::new(reports, total, page, per_page))
    }
}
