use chrono::NaiveDate;

use crate::{
    model::stats::{OverviewDto, TimelinePointDto, TopSourceDto},
    server::util::parse::pass_rate,
};

/// Aggregated counters for one domain over a time window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub domain_id: i32,
    pub days: i64,
    pub total_messages: i64,
    pub passed: i64,
    pub dkim_pass: i64,
    pub spf_pass: i64,
    pub disposition_none: i64,
    pub disposition_quarantine: i64,
    pub disposition_reject: i64,
    pub report_count: u64,
    pub source_count: u64,
    pub top_sources: Vec<TopSource>,
}

impl Overview {
    pub fn failed(&self) -> i64 {
        self.total_messages - self.passed
    }

    pub fn pass_rate(&self) -> f64 {
        pass_rate(self.passed, self.total_messages)
    }

    pub fn into_dto(self) -> OverviewDto {
        OverviewDto {
            failed: self.failed(),
            pass_rate: self.pass_rate(),
            domain_id: self.domain_id,
            days: self.days,
            total_messages: self.total_messages,
            passed: self.passed,
            dkim_pass: self.dkim_pass,
            spf_pass: self.spf_pass,
            disposition_none: self.disposition_none,
            disposition_quarantine: self.disposition_quarantine,
            disposition_reject: self.disposition_reject,
            report_count: self.report_count,
            source_count: self.source_count,
            top_sources: self.top_sources.into_iter().map(TopSource::into_dto).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopSource {
    pub source_ip: String,
    pub total: i64,
    pub passed: i64,
}

impl TopSource {
    pub fn into_dto(self) -> TopSourceDto {
        TopSourceDto {
            pass_rate: pass_rate(self.passed, self.total),
            source_ip: self.source_ip,
            total: self.total,
            passed: self.passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub total: i64,
    pub passed: i64,
}

impl TimelinePoint {
    pub fn into_dto(self) -> TimelinePointDto {
        TimelinePointDto {
            date: self.date,
            total: self.total,
            passed: self.passed,
            failed: self.total - self.passed,
            pass_rate: pass_rate(self.passed, self.total),
        }
    }
}
