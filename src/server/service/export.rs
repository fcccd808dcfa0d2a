//! CSV export of a domain's report records.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::report::ReportRepository, error::AppError, model::report::RecordWithReport,
};

const HEADER: [&str; 16] = [
    "report_id",
    "reporter",
    "date_begin",
    "date_end",
    "source_ip",
    "count",
    "disposition",
    "dkim",
    "spf",
    "dmarc",
    "header_from",
    "envelope_from",
    "dkim_domain",
    "dkim_result",
    "spf_domain",
    "spf_result",
];

pub struct ExportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ExportService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Renders every record of reports starting in the last `days` days as CSV.
    ///
    /// # Returns
    /// - `Ok(bytes)` - CSV document with a header row and one row per record
    pub async fn records_csv(&self, domain_id: i32, days: i64) -> Result<Vec<u8>, AppError> {
        let since = Utc::now() - Duration::days(days);
        let rows = ReportRepository::new(self.db)
            .get_records_since(domain_id, since)
            .await?;

        let csv = write_csv(&rows)?;
        tracing::debug!("Exported {} records of domain {}", rows.len(), domain_id);

        Ok(csv)
    }
}

/// Writes records in the export column layout.
pub fn write_csv(rows: &[RecordWithReport]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_err = |e: csv::Error| AppError::InternalError(format!("Failed to write CSV: {}", e));

    writer.write_record(HEADER).map_err(to_err)?;
    for row in rows {
        let (r, report) = (&row.record, &row.report);
        writer
            .write_record([
                report.report_id.as_str(),
                report.org_name.as_str(),
                &report.date_begin.to_rfc3339(),
                &report.date_end.to_rfc3339(),
                r.source_ip.as_str(),
                &r.count.to_string(),
                r.disposition.as_str(),
                r.dkim.as_str(),
                r.spf.as_str(),
                if r.dmarc_pass() { "pass" } else { "fail" },
                r.header_from.as_str(),
                r.envelope_from.as_deref().unwrap_or_default(),
                r.dkim_domain.as_deref().unwrap_or_default(),
                r.dkim_result.as_deref().unwrap_or_default(),
                r.spf_domain.as_deref().unwrap_or_default(),
                r.spf_result.as_deref().unwrap_or_default(),
            ])
            .map_err(to_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush CSV: {}", e)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::server::model::report::{Record, Report};

    fn row(ip: &str, count: i64, dkim: &str, envelope_from: Option<&str>) -> RecordWithReport {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        RecordWithReport {
            record: Record {
                id: 1,
                report_id: 1,
                source_ip: ip.into(),
                count,
                disposition: "none".into(),
                dkim: dkim.into(),
                spf: "fail".into(),
                header_from: "example.com".into(),
                envelope_from: envelope_from.map(str::to_string),
                dkim_domain: Some("example.com".into()),
                dkim_result: Some(dkim.into()),
                spf_domain: None,
                spf_result: None,
            },
            report: Report {
                id: 1,
                domain_id: 1,
                org_name: "google.com".into(),
                reporter_email: None,
                report_id: "123,456".into(),
                date_begin: at,
                date_end: at + Duration::days(1),
                policy_domain: "example.com".into(),
                policy_p: "none".into(),
                policy_sp: None,
                policy_pct: None,
                policy_adkim: None,
                policy_aspf: None,
                total_count: 0,
                pass_count: 0,
                fail_count: 0,
                created_at: at,
            },
        }
    }

    /// Expected: header row plus exactly one row per record
    #[test]
    fn writes_one_row_per_record() {
        let rows = vec![
            row("192.0.2.1", 10, "pass", Some("bounce.example.com")),
            row("192.0.2.2", 3, "fail", None),
            row("192.0.2.3", 1, "fail", None),
        ];

        let csv = write_csv(&rows).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_slice());

        assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>(), HEADER);
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), rows.len());
        assert_eq!(&records[0][0], "123,456");
        assert_eq!(&records[0][2], "2026-02-01T00:00:00+00:00");
        assert_eq!(&records[0][9], "pass");
        assert_eq!(&records[0][11], "bounce.example.com");
        assert_eq!(&records[1][9], "fail");
        assert_eq!(&records[1][11], "");
    }

    #[test]
    fn empty_export_has_only_header() {
        let csv = write_csv(&[]).unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap().trim_end(),
            HEADER.join(",")
        );
    }
}
