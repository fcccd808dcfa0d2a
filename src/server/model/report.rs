//! Aggregate and forensic report domain models.
//!
//! `Parsed*` types hold the content of an uploaded report before it is matched
//! to a domain and stored; the remaining types mirror stored rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::report::{
    ForensicReportDto, IngestResultDto, RecordDto, ReportDetailDto, ReportDto, ReportKind,
};
use crate::server::util::parse::pass_rate;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: i32,
    pub domain_id: i32,
    pub org_name: String,
    pub reporter_email: Option<String>,
    pub report_id: String,
    pub date_begin: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub policy_domain: String,
    pub policy_p: String,
    pub policy_sp: Option<String>,
    pub policy_pct: Option<i32>,
    pub policy_adkim: Option<String>,
    pub policy_aspf: Option<String>,
    pub total_count: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn from_entity(entity: entity::report::Model) -> Self {
        Self {
            id: entity.id,
            domain_id: entity.domain_id,
            org_name: entity.org_name,
            reporter_email: entity.reporter_email,
            report_id: entity.report_id,
            date_begin: entity.date_begin,
            date_end: entity.date_end,
            policy_domain: entity.policy_domain,
            policy_p: entity.policy_p,
            policy_sp: entity.policy_sp,
            policy_pct: entity.policy_pct,
            policy_adkim: entity.policy_adkim,
            policy_aspf: entity.policy_aspf,
            total_count: entity.total_count,
            pass_count: entity.pass_count,
            fail_count: entity.fail_count,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> ReportDto {
        ReportDto {
            id: self.id,
            domain_id: self.domain_id,
            pass_rate: pass_rate(self.pass_count, self.total_count),
            org_name: self.org_name,
            reporter_email: self.reporter_email,
            report_id: self.report_id,
            date_begin: self.date_begin,
            date_end: self.date_end,
            policy_p: self.policy_p,
            policy_pct: self.policy_pct,
            total_count: self.total_count,
            pass_count: self.pass_count,
            fail_count: self.fail_count,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i32,
    pub report_id: i32,
    pub source_ip: String,
    pub count: i64,
    pub disposition: String,
    pub dkim: String,
    pub spf: String,
    pub header_from: String,
    pub envelope_from: Option<String>,
    pub dkim_domain: Option<String>,
    pub dkim_result: Option<String>,
    pub spf_domain: Option<String>,
    pub spf_result: Option<String>,
}

impl Record {
    pub fn from_entity(entity: entity::record::Model) -> Self {
        Self {
            id: entity.id,
            report_id: entity.report_id,
            source_ip: entity.source_ip,
            count: entity.count,
            disposition: entity.disposition,
            dkim: entity.dkim,
            spf: entity.spf,
            header_from: entity.header_from,
            envelope_from: entity.envelope_from,
            dkim_domain: entity.dkim_domain,
            dkim_result: entity.dkim_result,
            spf_domain: entity.spf_domain,
            spf_result: entity.spf_result,
        }
    }

    /// A record passes DMARC when the policy-evaluated DKIM or SPF result is `pass`.
    pub fn dmarc_pass(&self) -> bool {
        is_aligned_pass(&self.dkim, &self.spf)
    }

    pub fn into_dto(self) -> RecordDto {
        RecordDto {
            id: self.id,
            dmarc_pass: self.dmarc_pass(),
            source_ip: self.source_ip,
            count: self.count,
            disposition: self.disposition,
            dkim: self.dkim,
            spf: self.spf,
            header_from: self.header_from,
            envelope_from: self.envelope_from,
            dkim_domain: self.dkim_domain,
            dkim_result: self.dkim_result,
            spf_domain: self.spf_domain,
            spf_result: self.spf_result,
        }
    }
}

pub fn is_aligned_pass(dkim: &str, spf: &str) -> bool {
    dkim.eq_ignore_ascii_case("pass") || spf.eq_ignore_ascii_case("pass")
}

#[derive(Debug, Clone)]
pub struct ReportDetail {
    pub report: Report,
    pub records: Vec<Record>,
}

impl ReportDetail {
    pub fn into_dto(self) -> ReportDetailDto {
        ReportDetailDto {
            policy_domain: self.report.policy_domain.clone(),
            policy_sp: self.report.policy_sp.clone(),
            policy_adkim: self.report.policy_adkim.clone(),
            policy_aspf: self.report.policy_aspf.clone(),
            report: self.report.into_dto(),
            records: self.records.into_iter().map(Record::into_dto).collect(),
        }
    }
}

/// A record joined with the report it belongs to, as used by statistics
/// and CSV export.
#[derive(Debug, Clone)]
pub struct RecordWithReport {
    pub record: Record,
    pub report: Report,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForensicReport {
    pub id: i32,
    pub domain_id: i32,
    pub feedback_type: String,
    pub reported_domain: String,
    pub source_ip: Option<String>,
    pub arrival_date: Option<String>,
    pub original_mail_from: Option<String>,
    pub original_rcpt_to: Option<String>,
    pub subject: Option<String>,
    pub auth_failure: Option<String>,
    pub authentication_results: Option<String>,
    pub delivery_result: Option<String>,
    pub dkim_domain: Option<String>,
    pub raw_headers: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ForensicReport {
    pub fn from_entity(entity: entity::forensic_report::Model) -> Self {
        Self {
            id: entity.id,
            domain_id: entity.domain_id,
            feedback_type: entity.feedback_type,
            reported_domain: entity.reported_domain,
            source_ip: entity.source_ip,
            arrival_date: entity.arrival_date,
            original_mail_from: entity.original_mail_from,
            original_rcpt_to: entity.original_rcpt_to,
            subject: entity.subject,
            auth_failure: entity.auth_failure,
            authentication_results: entity.authentication_results,
            delivery_result: entity.delivery_result,
            dkim_domain: entity.dkim_domain,
            raw_headers: entity.raw_headers,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> ForensicReportDto {
        ForensicReportDto {
            id: self.id,
            domain_id: self.domain_id,
            feedback_type: self.feedback_type,
            reported_domain: self.reported_domain,
            source_ip: self.source_ip,
            arrival_date: self.arrival_date,
            original_mail_from: self.original_mail_from,
            original_rcpt_to: self.original_rcpt_to,
            subject: self.subject,
            auth_failure: self.auth_failure,
            authentication_results: self.authentication_results,
            delivery_result: self.delivery_result,
            dkim_domain: self.dkim_domain,
            created_at: self.created_at,
        }
    }
}

/// Content of an aggregate (RUA) report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAggregateReport {
    pub org_name: String,
    pub reporter_email: Option<String>,
    pub report_id: String,
    pub date_begin: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub policy_domain: String,
    pub policy_p: String,
    pub policy_sp: Option<String>,
    pub policy_pct: Option<i32>,
    pub policy_adkim: Option<String>,
    pub policy_aspf: Option<String>,
    pub records: Vec<ParsedRecord>,
}

impl ParsedAggregateReport {
    /// Returns `(total, passed)` message counts over all records.
    pub fn totals(&self) -> (i64, i64) {
        self.records.iter().fold((0, 0), |(total, passed), r| {
            let pass = if is_aligned_pass(&r.dkim, &r.spf) {
                r.count
            } else {
                0
            };
            (total + r.count, passed + pass)
        })
    }

    /// Sums record counts per source IP, keeping first-seen order.
    pub fn traffic_by_source(&self) -> Vec<SourceTraffic> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut traffic: Vec<SourceTraffic> = Vec::new();

        for record in &self.records {
            let passed = if is_aligned_pass(&record.dkim, &record.spf) {
                record.count
            } else {
                0
            };
            match index.get(record.source_ip.as_str()) {
                Some(&i) => {
                    traffic[i].count += record.count;
                    traffic[i].passed += passed;
                }
                None => {
                    index.insert(&record.source_ip, traffic.len());
                    traffic.push(SourceTraffic {
                        ip: record.source_ip.clone(),
                        count: record.count,
                        passed,
                    });
                }
            }
        }

        traffic
    }
}

/// Message counts of one source IP within a report.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTraffic {
    pub ip: String,
    pub count: i64,
    pub passed: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub source_ip: String,
    pub count: i64,
    pub disposition: String,
    pub dkim: String,
    pub spf: String,
    pub header_from: String,
    pub envelope_from: Option<String>,
    pub dkim_domain: Option<String>,
    pub dkim_result: Option<String>,
    pub spf_domain: Option<String>,
    pub spf_result: Option<String>,
}

/// Content of a forensic (RUF) failure report in ARF format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedForensicReport {
    pub feedback_type: String,
    pub reported_domain: String,
    pub source_ip: Option<String>,
    pub arrival_date: Option<String>,
    pub original_mail_from: Option<String>,
    pub original_rcpt_to: Option<String>,
    pub subject: Option<String>,
    pub auth_failure: Option<String>,
    pub authentication_results: Option<String>,
    pub delivery_result: Option<String>,
    pub dkim_domain: Option<String>,
    pub raw_headers: Option<String>,
}

/// Outcome of ingesting a single report.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResult {
    pub kind: ReportKind,
    pub domain_id: i32,
    pub report_id: Option<i32>,
    pub duplicate: bool,
    pub records: u64,
    pub new_sources: u64,
}

impl IngestResult {
    pub fn into_dto(self) -> IngestResultDto {
        IngestResultDto {
            kind: self.kind,
            domain_id: self.domain_id,
            report_id: self.report_id,
            duplicate: self.duplicate,
            records: self.records,
            new_sources: self.new_sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(ip: &str, count: i64, dkim: &str, spf: &str) -> ParsedRecord {
        ParsedRecord {
            source_ip: ip.into(),
            count,
            disposition: "none".into(),
            dkim: dkim.into(),
            spf: spf.into(),
            header_from: "example.com".into(),
            envelope_from: None,
            dkim_domain: None,
            dkim_result: None,
            spf_domain: None,
            spf_result: None,
        }
    }

    fn report(records: Vec<ParsedRecord>) -> ParsedAggregateReport {
        let begin = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        ParsedAggregateReport {
            org_name: "google.com".into(),
            reporter_email: None,
            report_id: "r-1".into(),
            date_begin: begin,
            date_end: begin + chrono::Duration::days(1),
            policy_domain: "example.com".into(),
            policy_p: "none".into(),
            policy_sp: None,
            policy_pct: None,
            policy_adkim: None,
            policy_aspf: None,
            records,
        }
    }

    /// Expected: records of the same IP summed, aligned passes counted
    #[test]
    fn sums_traffic_per_source() {
        let traffic = report(vec![
            record("192.0.2.1", 10, "pass", "fail"),
            record("192.0.2.2", 4, "fail", "fail"),
            record("192.0.2.1", 5, "fail", "pass"),
        ])
        .traffic_by_source();

        assert_eq!(
            traffic,
            vec![
                SourceTraffic {
                    ip: "192.0.2.1".into(),
                    count: 15,
                    passed: 15
                },
                SourceTraffic {
                    ip: "192.0.2.2".into(),
                    count: 4,
                    passed: 0
                },
            ]
        );
    }

    #[test]
    fn totals_count_aligned_passes() {
        let parsed = report(vec![
            record("192.0.2.1", 10, "pass", "fail"),
            record("192.0.2.2", 4, "fail", "fail"),
        ]);

        assert_eq!(parsed.totals(), (14, 10));
    }
}
