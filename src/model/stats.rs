use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct OverviewDto {
    pub domain_id: i32,
    pub days: i64,
    pub total_messages: i64,
    pub passed: i64,
    pub failed: i64,
    pub pass_rate: f64,
    pub dkim_pass: i64,
    pub spf_pass: i64,
    pub disposition_none: i64,
    pub disposition_quarantine: i64,
    pub disposition_reject: i64,
    pub report_count: u64,
    pub source_count: u64,
    pub top_sources: Vec<TopSourceDto>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct TopSourceDto {
    pub source_ip: String,
    pub total: i64,
    pub passed: i64,
    pub pass_rate: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct TimelinePointDto {
    pub date: NaiveDate,
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub pass_rate: f64,
}
