use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use test_utils::{builder::TestBuilder, factory};

use crate::server::{
    data::report::ReportRepository,
    model::report::{ParsedAggregateReport, ParsedRecord},
};

mod create;
mod get_records_ingested_between;
mod get_records_since;

fn record(ip: &str, count: i64, dkim: &str, spf: &str) -> ParsedRecord {
    ParsedRecord {
        source_ip: ip.to_string(),
        count,
        disposition: "none".to_string(),
        dkim: dkim.to_string(),
        spf: spf.to_string(),
        header_from: "example.com".to_string(),
        envelope_from: None,
        dkim_domain: Some("example.com".to_string()),
        dkim_result: Some(dkim.to_string()),
        spf_domain: Some("example.com".to_string()),
        spf_result: Some(spf.to_string()),
    }
}

fn parsed(report_id: &str, records: Vec<ParsedRecord>) -> ParsedAggregateReport {
    let date_begin = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    ParsedAggregateReport {
        org_name: "google.com".to_string(),
        reporter_email: Some("noreply-dmarc-support@google.com".to_string()),
        report_id: report_id.to_string(),
        date_begin,
        date_end: date_begin + Duration::days(1),
        policy_domain: "example.com".to_string(),
        policy_p: "none".to_string(),
        policy_sp: None,
        policy_pct: Some(100),
        policy_adkim: None,
        policy_aspf: None,
        records,
    }
}
