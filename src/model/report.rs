use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct ReportDto {
    pub id: i32,
    pub domain_id: i32,
    pub org_name: String,
    pub reporter_email: Option<String>,
    pub report_id: String,
    pub date_begin: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub policy_p: String,
    pub policy_pct: Option<i32>,
    pub total_count: i64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub pass_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct RecordDto {
    pub id: i32,
    pub source_ip: String,
    pub count: i64,
    pub disposition: String,
    pub dkim: String,
    pub spf: String,
    pub dmarc_pass: bool,
    pub header_from: String,
    pub envelope_from: Option<String>,
    pub dkim_domain: Option<String>,
    pub dkim_result: Option<String>,
    pub spf_domain: Option<String>,
    pub spf_result: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct ReportDetailDto {
    pub report: ReportDto,
    pub policy_domain: String,
    pub policy_sp: Option<String>,
    pub policy_adkim: Option<String>,
    pub policy_aspf: Option<String>,
    pub records: Vec<RecordDto>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct ForensicReportDto {
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
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    #[default]
    Aggregate,
    Forensic,
}

/// Outcome of ingesting one report file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct IngestResultDto {
    pub kind: ReportKind,
    pub domain_id: i32,
    /// Id of the stored report, absent when the report was a duplicate
    pub report_id: Option<i32>,
    pub duplicate: bool,
    pub records: u64,
    pub new_sources: u64,
}
